//! # AlgoKit application specification types
//!
//! Serde models for the two application specification schemas a typed client
//! can be generated from, plus the ABI type grammar they reference.
//!
//! - [`arc56`] - the ARC-56 contract description, the normalized model every
//!   consumer works with
//! - [`arc32`] - the legacy ARC-32 `application.json` schema and its
//!   conversion into ARC-56
//! - [`abi_type`] - parsing and canonical rendering of ABI type strings
//!
//! ```rust,ignore
//! use algokit_app_spec::AppSpec;
//!
//! let spec = AppSpec::from_json(&std::fs::read_to_string("application.json")?)?;
//! let contract = spec.into_arc56()?;
//! println!("{} exposes {} methods", contract.name, contract.methods.len());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

pub mod abi_type;
pub mod arc32;
pub mod arc56;
pub mod error;

pub use abi_type::AbiType;
pub use arc32::Arc32ApplicationSpec;
pub use arc56::{Arc56Contract, Method, OnCompleteAction, StructField, StructFieldType};
pub use error::{SpecError, SpecResult};

use serde_json::Value;

/// An application specification in either supported schema version.
#[derive(Debug, Clone)]
pub enum AppSpec {
    /// A legacy ARC-32 `application.json` document.
    Arc32(Box<Arc32ApplicationSpec>),
    /// An ARC-56 contract description, kept alongside its raw JSON so it can
    /// be re-embedded verbatim.
    Arc56 {
        /// The parsed contract.
        contract: Box<Arc56Contract>,
        /// The document exactly as it was read.
        raw: Value,
    },
}

impl AppSpec {
    /// Parses a JSON document, detecting the schema version from its shape.
    pub fn from_json(json: &str) -> SpecResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Detects the schema version of an already parsed JSON document.
    ///
    /// An object carrying `contract` and `hints` is ARC-32; one carrying
    /// `name` and `methods` at the top level is ARC-56.
    pub fn from_value(value: Value) -> SpecResult<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| SpecError::UnknownSchema("document is not a JSON object".to_string()))?;

        if object.contains_key("contract") && object.contains_key("hints") {
            let spec: Arc32ApplicationSpec = serde_json::from_value(value)?;
            return Ok(Self::Arc32(Box::new(spec)));
        }

        if object.contains_key("name") && object.contains_key("methods") {
            let contract: Arc56Contract = serde_json::from_value(value.clone())?;
            return Ok(Self::Arc56 {
                contract: Box::new(contract),
                raw: value,
            });
        }

        Err(SpecError::UnknownSchema(
            "expected an ARC-32 (contract + hints) or ARC-56 (name + methods) document".to_string(),
        ))
    }

    /// Returns the contract name declared by the specification.
    pub fn contract_name(&self) -> &str {
        match self {
            Self::Arc32(spec) => &spec.contract.name,
            Self::Arc56 { contract, .. } => &contract.name,
        }
    }

    /// Normalizes the specification into the ARC-56 JSON document.
    ///
    /// ARC-56 input is returned untouched; ARC-32 input is converted first.
    pub fn into_arc56_value(self) -> SpecResult<Value> {
        match self {
            Self::Arc32(spec) => Ok(serde_json::to_value(spec.to_arc56()?)?),
            Self::Arc56 { raw, .. } => Ok(raw),
        }
    }

    /// Normalizes the specification into the ARC-56 model.
    pub fn into_arc56(self) -> SpecResult<Arc56Contract> {
        match self {
            Self::Arc32(spec) => spec.to_arc56(),
            Self::Arc56 { contract, .. } => Ok(*contract),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_arc56() {
        let json = r#"{
            "name": "Counter",
            "methods": [],
            "arcs": [4, 56]
        }"#;
        let spec = AppSpec::from_json(json).unwrap();
        assert!(matches!(spec, AppSpec::Arc56 { .. }));
        assert_eq!(spec.contract_name(), "Counter");
    }

    #[test]
    fn test_detects_arc32() {
        let json = r#"{
            "hints": {},
            "contract": {"name": "Counter", "methods": []},
            "bare_call_config": {"no_op": "CREATE"}
        }"#;
        let spec = AppSpec::from_json(json).unwrap();
        assert!(matches!(spec, AppSpec::Arc32(_)));
        assert_eq!(spec.contract_name(), "Counter");

        let contract = spec.into_arc56().unwrap();
        assert_eq!(contract.bare_actions.create, vec![OnCompleteAction::NoOp]);
    }

    #[test]
    fn test_rejects_unknown_schema() {
        let err = AppSpec::from_json(r#"{"foo": 1}"#).unwrap_err();
        assert!(matches!(err, SpecError::UnknownSchema(_)));

        let err = AppSpec::from_json("[1, 2]").unwrap_err();
        assert!(matches!(err, SpecError::UnknownSchema(_)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = AppSpec::from_json("{").unwrap_err();
        assert!(matches!(err, SpecError::Json(_)));
    }
}
