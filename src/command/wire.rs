//! Compact binary encoding of commands for network sync and replay
//!
//! Layout (little-endian): `[type: u8][tick: u32][payload]`
//!
//! | type | command          | payload                                  |
//! |------|------------------|------------------------------------------|
//! | 1    | DeclareWar       | attacker u16, defender u16               |
//! | 2    | MakePeace        | a u16, b u16                             |
//! | 3    | ImproveRelations | source u16, target u16, gold_cost u32    |

use crate::command::{DeclareWarCommand, DiplomacyCommand, ImproveRelationsCommand, MakePeaceCommand};
use crate::core::error::{ArchonError, Result};
use crate::core::types::CountryId;

pub const DECLARE_WAR: u8 = 1;
pub const MAKE_PEACE: u8 = 2;
pub const IMPROVE_RELATIONS: u8 = 3;

/// Type byte plus tick
pub const HEADER_LEN: usize = 5;

impl DiplomacyCommand {
    pub fn type_id(&self) -> u8 {
        match self {
            DiplomacyCommand::DeclareWar(_) => DECLARE_WAR,
            DiplomacyCommand::MakePeace(_) => MAKE_PEACE,
            DiplomacyCommand::ImproveRelations(_) => IMPROVE_RELATIONS,
        }
    }

    /// Total encoded size in bytes
    pub fn encoded_len(&self) -> usize {
        HEADER_LEN + payload_len(self.type_id()).unwrap_or(0)
    }

    /// Append the encoded command to `out`
    pub fn encode(&self, out: &mut Vec<u8>) {
        out.push(self.type_id());
        out.extend_from_slice(&self.tick().to_le_bytes());
        match self {
            DiplomacyCommand::DeclareWar(cmd) => {
                out.extend_from_slice(&cmd.attacker.0.to_le_bytes());
                out.extend_from_slice(&cmd.defender.0.to_le_bytes());
            }
            DiplomacyCommand::MakePeace(cmd) => {
                out.extend_from_slice(&cmd.a.0.to_le_bytes());
                out.extend_from_slice(&cmd.b.0.to_le_bytes());
            }
            DiplomacyCommand::ImproveRelations(cmd) => {
                out.extend_from_slice(&cmd.source.0.to_le_bytes());
                out.extend_from_slice(&cmd.target.0.to_le_bytes());
                out.extend_from_slice(&cmd.gold_cost.to_le_bytes());
            }
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.encode(&mut out);
        out
    }

    /// Decode one command from the front of `bytes`, returns it with the bytes consumed
    pub fn decode(bytes: &[u8]) -> Result<(Self, usize)> {
        let mut reader = WireReader::new(bytes);
        let type_id = reader.u8()?;
        let payload = payload_len(type_id).ok_or(ArchonError::UnknownCommandType(type_id))?;
        reader.require(HEADER_LEN - 1 + payload)?;

        let tick = reader.u32()?;
        let command = match type_id {
            DECLARE_WAR => DeclareWarCommand::new(reader.country()?, reader.country()?, tick).into(),
            MAKE_PEACE => MakePeaceCommand::new(reader.country()?, reader.country()?, tick).into(),
            IMPROVE_RELATIONS => {
                ImproveRelationsCommand::new(reader.country()?, reader.country()?, reader.u32()?, tick).into()
            }
            other => return Err(ArchonError::UnknownCommandType(other)),
        };
        Ok((command, reader.position()))
    }
}

/// Decode back-to-back commands until `bytes` is exhausted
pub fn decode_stream(bytes: &[u8]) -> Result<Vec<DiplomacyCommand>> {
    let mut commands = Vec::new();
    let mut offset = 0;
    while offset < bytes.len() {
        let (command, used) = DiplomacyCommand::decode(&bytes[offset..])?;
        commands.push(command);
        offset += used;
    }
    Ok(commands)
}

fn payload_len(type_id: u8) -> Option<usize> {
    match type_id {
        DECLARE_WAR | MAKE_PEACE => Some(4),
        IMPROVE_RELATIONS => Some(8),
        _ => None,
    }
}

struct WireReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn position(&self) -> usize {
        self.pos
    }

    /// At least `n` more bytes remain
    fn require(&self, n: usize) -> Result<()> {
        let available = self.bytes.len() - self.pos;
        if available < n {
            return Err(ArchonError::TruncatedCommand {
                needed: self.pos + n,
                available: self.bytes.len(),
            });
        }
        Ok(())
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.require(N)?;
        let mut buf = [0u8; N];
        buf.copy_from_slice(&self.bytes[self.pos..self.pos + N]);
        self.pos += N;
        Ok(buf)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take::<1>()?[0])
    }

    fn u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.take::<4>()?))
    }

    fn country(&mut self) -> Result<CountryId> {
        Ok(CountryId(u16::from_le_bytes(self.take::<2>()?)))
    }
}
