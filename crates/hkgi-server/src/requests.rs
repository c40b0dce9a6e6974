//! JSON-lines request channel.
//!
//! One request object per line in, one response object per line out:
//!
//! ```text
//! {"op": "craft", "user": "orpheus", "plot_index": 0, "recipe_index": 0}
//! {"ok": true, "data": {"outcome": "transformed", "plot": 0, "kind": "bbc"}}
//! ```

use std::collections::BTreeMap;

use hkgi_core::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Signup {
        user: String,
    },
    UseItem {
        user: String,
        item: ItemKind,
    },
    Craft {
        user: String,
        plot_index: usize,
        recipe_index: usize,
    },
    Gift {
        from: String,
        to: String,
        items: BTreeMap<ItemKind, u64>,
    },
    GetStead {
        user: String,
    },
    Manifest,
    Activity {
        #[serde(default)]
        since_ms: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Response {
    fn ok(data: Option<Value>) -> Self {
        Self {
            ok: true,
            msg: None,
            data,
        }
    }

    fn err(msg: impl ToString) -> Self {
        Self {
            ok: false,
            msg: Some(msg.to_string()),
            data: None,
        }
    }
}

/// Parse and run one request line.
pub fn handle_line(engine: &Engine, line: &str, rng: &mut impl Rng) -> Response {
    match serde_json::from_str::<Request>(line) {
        Ok(request) => handle(engine, request, rng),
        Err(e) => {
            tracing::debug!(error = %e, "malformed request");
            Response::err(format!("learn how to use the api noob: {e}"))
        }
    }
}

pub fn handle(engine: &Engine, request: Request, rng: &mut impl Rng) -> Response {
    let result = match request {
        Request::Signup { user } => engine.signup(&user).map(|()| Response::ok(None)),
        Request::UseItem { user, item } => engine
            .use_item(&user, item, rng)
            .map(|outcome| respond(&outcome)),
        Request::Craft {
            user,
            plot_index,
            recipe_index,
        } => engine
            .craft(&user, plot_index, recipe_index, rng)
            .map(|outcome| respond(&outcome)),
        Request::Gift { from, to, items } => engine
            .gift(&from, &to, &items)
            .map(|()| Response::ok(None)),
        Request::GetStead { user } => engine.serialize_stead(&user).map(|view| respond(&view)),
        Request::Manifest => Ok(respond(engine.manifest())),
        Request::Activity { since_ms } => Ok(respond(&engine.recent_activity(since_ms))),
    };
    result.unwrap_or_else(Response::err)
}

/// Successful response carrying `value`. An encoding failure is a server
/// fault, not the player's, so it is logged and reported generically.
fn respond<T: Serialize>(value: &T) -> Response {
    match serde_json::to_value(value) {
        Ok(data) => Response::ok(Some(data)),
        Err(e) => {
            tracing::error!(error = %e, "response serialization failed");
            Response::err("internal error: response could not be encoded")
        }
    }
}
