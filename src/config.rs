//! Service configuration
//!
//! Read from the environment (after `.env` has been loaded by the binary).

use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const BIND_ADDR_VAR: &str = "RECORDS_BIND_ADDR";
pub const PATIENTS_PATH_VAR: &str = "RECORDS_PATIENTS_PATH";
pub const STUDENTS_PATH_VAR: &str = "RECORDS_STUDENTS_PATH";
pub const INIT_STORES_VAR: &str = "RECORDS_INIT_STORES";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Address the HTTP listener binds to
    pub bind_addr: SocketAddr,
    /// JSON document holding every patient
    pub patients_path: PathBuf,
    /// JSON document holding every student
    pub students_path: PathBuf,
    /// Create empty store files at startup when they are missing
    pub init_stores: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            patients_path: PathBuf::from("patients.json"),
            students_path: PathBuf::from("students.json"),
            init_stores: false,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(addr) = lookup(BIND_ADDR_VAR) {
            config.bind_addr = addr
                .parse()
                .with_context(|| format!("{} is not a socket address: {:?}", BIND_ADDR_VAR, addr))?;
        }
        if let Some(path) = lookup(PATIENTS_PATH_VAR) {
            config.patients_path = PathBuf::from(path);
        }
        if let Some(path) = lookup(STUDENTS_PATH_VAR) {
            config.students_path = PathBuf::from(path);
        }
        if let Some(flag) = lookup(INIT_STORES_VAR) {
            config.init_stores = parse_flag(&flag)
                .with_context(|| format!("{} must be true or false, got {:?}", INIT_STORES_VAR, flag))?;
        }

        Ok(config)
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow::anyhow!("unrecognised flag value")),
    }
}
