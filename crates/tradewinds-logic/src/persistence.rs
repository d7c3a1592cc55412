//! Save/load of a whole colony.
//!
//! The state is written with bincode behind a version number. Buildings,
//! ships and jobs are addressed by id, so the saved form has no cycles.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::colony::ColonyState;
use crate::config::{ConfigError, SimConfig};

/// Version number for the save format (increment when the format changes).
pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    pub version: u32,
    pub config: SimConfig,
    pub state: ColonyState,
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Bincode(#[from] bincode::Error),
    #[error("saved config is invalid: {0}")]
    Config(#[from] ConfigError),
    #[error("save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

pub fn save_colony<W: Write>(writer: W, config: &SimConfig, state: &ColonyState) -> Result<(), PersistenceError> {
    let data = SaveData {
        version: SAVE_VERSION,
        config: config.clone(),
        state: state.clone(),
    };
    bincode::serialize_into(writer, &data)?;
    Ok(())
}

pub fn load_colony<R: Read>(reader: R) -> Result<SaveData, PersistenceError> {
    let data: SaveData = bincode::deserialize_from(reader)?;
    if data.version != SAVE_VERSION {
        return Err(PersistenceError::VersionMismatch {
            expected: SAVE_VERSION,
            found: data.version,
        });
    }
    data.config.validate()?;
    log::info!("loaded colony at day {}", data.state.date);
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buildings::BuildingKind;
    use crate::colony::test_state;
    use crate::construction::start_construction;
    use crate::events::EventLog;
    use crate::map::Position;

    #[test]
    fn test_save_load_roundtrip() {
        let mut state = test_state();
        start_construction(&mut state, BuildingKind::Farm, Position::new(5, 5), &mut EventLog::new())
            .unwrap();
        let config = SimConfig::default();

        let mut buf = Vec::new();
        save_colony(&mut buf, &config, &state).unwrap();
        let loaded = load_colony(buf.as_slice()).unwrap();
        assert_eq!(loaded.state, state);
        assert_eq!(loaded.config, config);
    }

    #[test]
    fn test_version_mismatch() {
        let data = SaveData {
            version: SAVE_VERSION + 1,
            config: SimConfig::default(),
            state: test_state(),
        };
        let buf = bincode::serialize(&data).unwrap();
        match load_colony(buf.as_slice()) {
            Err(PersistenceError::VersionMismatch { expected, found }) => {
                assert_eq!(expected, SAVE_VERSION);
                assert_eq!(found, SAVE_VERSION + 1);
            }
            other => panic!("expected version mismatch, got {:?}", other.map(|d| d.version)),
        }
    }

    #[test]
    fn test_invalid_saved_config_rejected() {
        let data = SaveData {
            version: SAVE_VERSION,
            config: SimConfig {
                native_daily_chance: 2.0,
                ..SimConfig::default()
            },
            state: test_state(),
        };
        let buf = bincode::serialize(&data).unwrap();
        assert!(matches!(load_colony(buf.as_slice()), Err(PersistenceError::Config(_))));
    }

    #[test]
    fn test_truncated_save_is_an_error() {
        let mut buf = Vec::new();
        save_colony(&mut buf, &SimConfig::default(), &test_state()).unwrap();
        buf.truncate(buf.len() / 2);
        assert!(load_colony(buf.as_slice()).is_err());
    }
}
