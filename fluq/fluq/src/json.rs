//! Versioned JSON serialization of plans, for crossing the data-provider
//! boundary. The envelope is `{ "version": 1, "plan": … }`; the payload is
//! opaque to the core.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ir::Plan;
use crate::{Error, Result};

const VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Envelope {
    version: u32,
    plan: Plan,
}

pub fn to_value(plan: &Plan) -> Result<Value> {
    serde_json::to_value(Envelope {
        version: VERSION,
        plan: plan.clone(),
    })
    .map_err(wrap)
}

pub fn to_string(plan: &Plan) -> Result<String> {
    serde_json::to_string(&Envelope {
        version: VERSION,
        plan: plan.clone(),
    })
    .map_err(wrap)
}

pub fn from_value(value: Value) -> Result<Plan> {
    let envelope: Envelope = serde_json::from_value(value).map_err(wrap)?;
    check_version(envelope)
}

pub fn from_str(json: &str) -> Result<Plan> {
    let envelope: Envelope = serde_json::from_str(json).map_err(wrap)?;
    check_version(envelope)
}

fn check_version(envelope: Envelope) -> Result<Plan> {
    if envelope.version != VERSION {
        return Err(Error::new_simple(format!(
            "unsupported plan version {}, expected {VERSION}",
            envelope.version
        )));
    }
    Ok(envelope.plan)
}

fn wrap(error: serde_json::Error) -> Error {
    Error::new_simple(format!("plan serialization failed: {error}"))
}
