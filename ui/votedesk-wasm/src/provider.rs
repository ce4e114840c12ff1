//! EIP-1193 binding to the wallet injected as `window.ethereum`.

use async_trait::async_trait;
use js_sys::{Function, Promise, Reflect};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use vd_contract_client::{ContractError, ContractResult, Eip1193Provider};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

/// Provider errors that carry no numeric code are treated as internal.
const INTERNAL_ERROR_CODE: i64 = -32603;

#[derive(Serialize)]
struct RequestArguments<'a> {
    method: &'a str,
    params: &'a Value,
}

/// Handle on the injected wallet. Cloning shares the same JS object, so the
/// wallet connector and the contract gateway talk to one extension.
#[derive(Clone)]
pub struct BrowserProvider {
    ethereum: Option<JsValue>,
}

impl BrowserProvider {
    pub fn detect() -> Self {
        let window = gloo_utils::window();
        let ethereum = Reflect::get(&window, &JsValue::from_str("ethereum"))
            .ok()
            .filter(|value| !value.is_undefined() && !value.is_null());
        Self { ethereum }
    }

    pub fn is_injected(&self) -> bool {
        self.ethereum.is_some()
    }

    /// Register `handler` for the wallet's `accountsChanged` event.
    pub fn on_accounts_changed<F>(&self, mut handler: F) -> Result<(), JsValue>
    where
        F: FnMut(Vec<String>) + 'static,
    {
        let Some(ethereum) = &self.ethereum else {
            return Ok(());
        };
        let on: Function = Reflect::get(ethereum, &JsValue::from_str("on"))?.dyn_into()?;
        let cb = Closure::wrap(Box::new(move |accounts: JsValue| {
            let accounts: Vec<String> = serde_wasm_bindgen::from_value(accounts).unwrap_or_default();
            handler(accounts);
        }) as Box<dyn FnMut(JsValue)>);
        on.call2(ethereum, &JsValue::from_str("accountsChanged"), cb.as_ref().unchecked_ref())?;
        cb.forget();
        Ok(())
    }
}

fn provider_error(err: JsValue) -> ContractError {
    let code = Reflect::get(&err, &JsValue::from_str("code"))
        .ok()
        .and_then(|code| code.as_f64())
        .map(|code| code as i64)
        .unwrap_or(INTERNAL_ERROR_CODE);
    let message = Reflect::get(&err, &JsValue::from_str("message"))
        .ok()
        .and_then(|message| message.as_string())
        .unwrap_or_else(|| format!("{err:?}"));
    ContractError::from_rpc(code, &message)
}

#[async_trait(?Send)]
impl Eip1193Provider for BrowserProvider {
    async fn request(&self, method: &str, params: Value) -> ContractResult<Value> {
        let ethereum = self.ethereum.as_ref().ok_or(ContractError::WalletUnavailable)?;
        let request: Function = Reflect::get(ethereum, &JsValue::from_str("request"))
            .ok()
            .and_then(|value| value.dyn_into().ok())
            .ok_or(ContractError::WalletUnavailable)?;

        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        let args = RequestArguments {
            method,
            params: &params,
        }
        .serialize(&serializer)
        .map_err(|err| ContractError::Decode(err.to_string()))?;

        let promise: Promise = request
            .call1(ethereum, &args)
            .map_err(provider_error)?
            .dyn_into()
            .map_err(|_| ContractError::Decode(format!("{method} did not return a promise")))?;
        let result = JsFuture::from(promise).await.map_err(provider_error)?;
        if result.is_undefined() {
            return Ok(Value::Null);
        }
        serde_wasm_bindgen::from_value(result).map_err(|err| ContractError::Decode(err.to_string()))
    }

    async fn pause(&self, duration: Duration) {
        gloo_timers::future::sleep(duration).await;
    }
}
