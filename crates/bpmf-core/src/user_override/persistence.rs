use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{Observation, Override, UserOverrideModel, MAGIC, VERSION};

/// Header: magic, version byte, CRC32 of the body.
const HEADER_LEN: usize = 9;

#[derive(Serialize, Deserialize)]
struct OverrideRecord {
    value: String,
    count: u32,
    timestamp: f64,
}

#[derive(Serialize, Deserialize)]
struct ObservationRecord {
    key: String,
    count: u32,
    overrides: Vec<OverrideRecord>,
}

/// Records in LRU order, most recent first.
#[derive(Serialize, Deserialize)]
struct UserOverrideData {
    records: Vec<ObservationRecord>,
}

fn invalid(msg: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

impl UserOverrideModel {
    pub fn to_bytes(&self) -> Result<Vec<u8>, io::Error> {
        let body = bincode::serialize(&self.to_data()).map_err(io::Error::other)?;
        let mut buf = Vec::with_capacity(HEADER_LEN + body.len());
        buf.extend_from_slice(MAGIC);
        buf.push(VERSION);
        buf.extend_from_slice(&crc32fast::hash(&body).to_le_bytes());
        buf.extend_from_slice(&body);
        Ok(buf)
    }

    /// Restore observations into a model with this model's capacity and
    /// decay. Records past capacity are dropped from the LRU tail.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<(), io::Error> {
        if bytes.len() < HEADER_LEN {
            return Err(invalid("too short"));
        }
        if &bytes[0..4] != MAGIC {
            return Err(invalid("bad magic"));
        }
        if bytes[4] != VERSION {
            return Err(invalid("unsupported version"));
        }
        let mut crc = [0u8; 4];
        crc.copy_from_slice(&bytes[5..HEADER_LEN]);
        let body = &bytes[HEADER_LEN..];
        if crc32fast::hash(body) != u32::from_le_bytes(crc) {
            return Err(invalid("checksum mismatch"));
        }
        let data: UserOverrideData = bincode::deserialize(body).map_err(invalid)?;
        self.apply_data(data);
        Ok(())
    }

    /// Deserialize with capacity and decay taken from settings.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, io::Error> {
        let mut model = Self::from_settings();
        model.load_bytes(bytes)?;
        Ok(model)
    }

    /// Atomic write: write to .tmp then rename.
    pub fn save(&self, path: &Path) -> Result<(), io::Error> {
        let bytes = self.to_bytes()?;
        let tmp = path.with_extension("tmp");
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Open from file, returning an empty model if the file doesn't exist.
    pub fn open(path: &Path) -> Result<Self, io::Error> {
        match fs::read(path) {
            Ok(bytes) => Self::from_bytes(&bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::from_settings()),
            Err(e) => Err(e),
        }
    }

    fn to_data(&self) -> UserOverrideData {
        let records = self
            .lru
            .iter()
            .filter_map(|key| {
                let obs = self.observations.get(key)?;
                let mut overrides: Vec<OverrideRecord> = obs
                    .overrides
                    .iter()
                    .map(|(value, o)| OverrideRecord {
                        value: value.clone(),
                        count: o.count,
                        timestamp: o.timestamp,
                    })
                    .collect();
                overrides.sort_by(|a, b| a.value.cmp(&b.value));
                Some(ObservationRecord {
                    key: key.clone(),
                    count: obs.count,
                    overrides,
                })
            })
            .collect();
        UserOverrideData { records }
    }

    fn apply_data(&mut self, data: UserOverrideData) {
        self.clear();
        for rec in data.records.into_iter().take(self.capacity) {
            let overrides: HashMap<String, Override> = rec
                .overrides
                .into_iter()
                .map(|o| {
                    (
                        o.value,
                        Override {
                            count: o.count,
                            timestamp: o.timestamp,
                        },
                    )
                })
                .collect();
            if self.observations.contains_key(&rec.key) {
                continue;
            }
            self.lru.push(rec.key.clone());
            self.observations.insert(
                rec.key,
                Observation {
                    count: rec.count,
                    overrides,
                },
            );
        }
    }
}
