//! Contract interface descriptions (JSON ABI) and the call encoding and log
//! decoding the client needs, on top of `alloy`'s dynamic ABI codec.

use std::collections::BTreeMap;

use alloy::dyn_abi::{DynSolValue, EventExt, FunctionExt, JsonAbiExt};
use alloy::json_abi::{Event, Function, JsonAbi, StateMutability};
use alloy::primitives::{Address, Bytes, B256, U256};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AbiError {
    #[error("malformed interface description: {0}")]
    Malformed(String),
    #[error("no function `{0}` in interface")]
    MissingFunction(String),
    #[error("no event `{0}` in interface")]
    MissingEvent(String),
    #[error("cannot encode `{name}` call: {reason}")]
    Encode { name: String, reason: String },
    #[error("cannot decode `{name}`: {reason}")]
    Decode { name: String, reason: String },
    #[error("log topic does not match event `{0}`")]
    TopicMismatch(String),
    #[error("missing value `{0}` in decoded data")]
    MissingValue(String),
}

/// Parse an interface description: either a bare list of ABI entries or a
/// build artifact carrying that list under `abi`.
pub fn parse_interface(json: &str) -> Result<JsonAbi, AbiError> {
    let document: Value =
        serde_json::from_str(json).map_err(|e| AbiError::Malformed(e.to_string()))?;
    let entries = match document {
        Value::Array(entries) => Value::Array(entries),
        Value::Object(mut fields) => fields
            .remove("abi")
            .ok_or_else(|| AbiError::Malformed("object has no `abi` list".into()))?,
        _ => {
            return Err(AbiError::Malformed(
                "expected a list of ABI entries or an object with an `abi` list".into(),
            ))
        }
    };
    serde_json::from_value(entries).map_err(|e| AbiError::Malformed(e.to_string()))
}

/// First function named `name`.
pub fn function<'a>(abi: &'a JsonAbi, name: &str) -> Result<&'a Function, AbiError> {
    abi.function(name)
        .and_then(|overloads| overloads.first())
        .ok_or_else(|| AbiError::MissingFunction(name.to_string()))
}

/// First event named `name`.
pub fn event<'a>(abi: &'a JsonAbi, name: &str) -> Result<&'a Event, AbiError> {
    abi.event(name)
        .and_then(|overloads| overloads.first())
        .ok_or_else(|| AbiError::MissingEvent(name.to_string()))
}

pub fn is_payable(function: &Function) -> bool {
    function.state_mutability == StateMutability::Payable
}

/// Selector followed by the encoded arguments.
pub fn encode_call(function: &Function, args: &[DynSolValue]) -> Result<Bytes, AbiError> {
    function
        .abi_encode_input(args)
        .map(Bytes::from)
        .map_err(|e| AbiError::Encode {
            name: function.name.clone(),
            reason: e.to_string(),
        })
}

/// The first return value of `function`, which must be an unsigned integer.
pub fn decode_uint_output(function: &Function, data: &[u8]) -> Result<U256, AbiError> {
    let values = function
        .abi_decode_output(data)
        .map_err(|e| AbiError::Decode {
            name: function.name.clone(),
            reason: e.to_string(),
        })?;
    values
        .first()
        .and_then(DynSolValue::as_uint)
        .map(|(value, _bits)| value)
        .ok_or_else(|| AbiError::MissingValue(function.name.clone()))
}

/// Named values decoded from an event log. Unnamed parameters are keyed by
/// their position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventValues(pub BTreeMap<String, DynSolValue>);

impl EventValues {
    pub fn get(&self, name: &str) -> Option<&DynSolValue> {
        self.0.get(name)
    }

    pub fn address(&self, name: &str) -> Result<Address, AbiError> {
        self.get(name)
            .and_then(DynSolValue::as_address)
            .ok_or_else(|| AbiError::MissingValue(name.to_string()))
    }

    pub fn uint(&self, name: &str) -> Result<U256, AbiError> {
        self.get(name)
            .and_then(DynSolValue::as_uint)
            .map(|(value, _bits)| value)
            .ok_or_else(|| AbiError::MissingValue(name.to_string()))
    }
}

/// Decode a log's topics and data against `event`'s inputs.
pub fn decode_log(event: &Event, topics: &[B256], data: &[u8]) -> Result<EventValues, AbiError> {
    if !event.anonymous && topics.first() != Some(&event.selector()) {
        return Err(AbiError::TopicMismatch(event.name.clone()));
    }
    let decoded = event
        .decode_log_parts(topics.iter().copied(), data)
        .map_err(|e| AbiError::Decode {
            name: event.name.clone(),
            reason: e.to_string(),
        })?;

    let mut indexed = decoded.indexed.into_iter();
    let mut body = decoded.body.into_iter();
    let mut values = BTreeMap::new();
    for (position, param) in event.inputs.iter().enumerate() {
        let value = if param.indexed {
            indexed.next()
        } else {
            body.next()
        };
        let Some(value) = value else {
            return Err(AbiError::MissingValue(param.name.clone()));
        };
        let key = if param.name.is_empty() {
            position.to_string()
        } else {
            param.name.clone()
        };
        values.insert(key, value);
    }
    Ok(EventValues(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::hex;

    const BANK_ABI: &str = r#"[
        {"type":"function","name":"deposit","inputs":[],"outputs":[],"stateMutability":"payable"},
        {"type":"function","name":"transfer","inputs":[{"name":"to","type":"address"},{"name":"amount","type":"uint256"}],"outputs":[],"stateMutability":"nonpayable"},
        {"type":"function","name":"getBalance","inputs":[{"name":"user","type":"address"}],"outputs":[{"name":"","type":"uint256"}],"stateMutability":"view"},
        {"type":"event","name":"Deposit","anonymous":false,"inputs":[{"name":"sender","type":"address","indexed":true},{"name":"amount","type":"uint256","indexed":false}]},
        {"type":"event","name":"Transfer","anonymous":false,"inputs":[{"name":"from","type":"address","indexed":true},{"name":"to","type":"address","indexed":true},{"name":"amount","type":"uint256","indexed":false}]}
    ]"#;

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    #[test]
    fn test_parse_bare_and_wrapped() {
        let bare = parse_interface(BANK_ABI).unwrap();
        let wrapped =
            parse_interface(&format!(r#"{{"contractName":"Bank","abi":{BANK_ABI}}}"#)).unwrap();
        assert_eq!(bare, wrapped);
        assert_eq!(bare.functions().count(), 3);
        assert_eq!(bare.events().count(), 2);
    }

    #[test]
    fn test_parse_rejects_other_shapes() {
        assert!(matches!(parse_interface("{}"), Err(AbiError::Malformed(_))));
        assert!(matches!(parse_interface("not json"), Err(AbiError::Malformed(_))));
        assert!(matches!(parse_interface(r#"{"abi": 3}"#), Err(AbiError::Malformed(_))));
        assert!(matches!(parse_interface("7"), Err(AbiError::Malformed(_))));
    }

    #[test]
    fn test_selectors() {
        let abi = parse_interface(BANK_ABI).unwrap();
        assert_eq!(hex::encode(function(&abi, "transfer").unwrap().selector()), "a9059cbb");
        assert_eq!(hex::encode(function(&abi, "deposit").unwrap().selector()), "d0e30db0");
        assert_eq!(hex::encode(function(&abi, "getBalance").unwrap().selector()), "f8b2cb4f");
        assert!(is_payable(function(&abi, "deposit").unwrap()));
        assert!(!is_payable(function(&abi, "transfer").unwrap()));
        assert_eq!(
            function(&abi, "withdraw").unwrap_err(),
            AbiError::MissingFunction("withdraw".into())
        );
    }

    #[test]
    fn test_event_topics() {
        let abi = parse_interface(BANK_ABI).unwrap();
        assert_eq!(
            event(&abi, "Transfer").unwrap().selector().to_string(),
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
        assert_eq!(
            event(&abi, "Deposit").unwrap().selector().to_string(),
            "0xe1fffcc4923d04b559f4d29a8bfc6cda04eb5b0d3c460751c2402c5c5cc9109c"
        );
    }

    #[test]
    fn test_encode_transfer() {
        let abi = parse_interface(BANK_ABI).unwrap();
        let data = encode_call(
            function(&abi, "transfer").unwrap(),
            &[
                DynSolValue::Address(addr(0x11)),
                DynSolValue::Uint(U256::from(1000u64), 256),
            ],
        )
        .unwrap();
        assert_eq!(data.len(), 4 + 64);
        assert_eq!(&data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(&data[16..36], &[0x11; 20]);
        assert_eq!(&data[66..], &[0x03, 0xe8]);
    }

    #[test]
    fn test_encode_argument_errors() {
        let abi = parse_interface(BANK_ABI).unwrap();
        let transfer = function(&abi, "transfer").unwrap();
        assert!(matches!(
            encode_call(transfer, &[DynSolValue::Address(addr(1))]),
            Err(AbiError::Encode { .. })
        ));
        assert!(matches!(
            encode_call(transfer, &[DynSolValue::Bool(true), DynSolValue::Bool(false)]),
            Err(AbiError::Encode { .. })
        ));
    }

    #[test]
    fn test_decode_uint_output() {
        let abi = parse_interface(BANK_ABI).unwrap();
        let get_balance = function(&abi, "getBalance").unwrap();
        let data = U256::from(7u64).to_be_bytes::<32>();
        assert_eq!(decode_uint_output(get_balance, &data).unwrap(), U256::from(7u64));
        assert!(matches!(
            decode_uint_output(get_balance, &[0u8; 8]),
            Err(AbiError::Decode { .. })
        ));
    }

    #[test]
    fn test_decode_transfer_log() {
        let abi = parse_interface(BANK_ABI).unwrap();
        let transfer = event(&abi, "Transfer").unwrap();
        let topics = [
            transfer.selector(),
            addr(0xaa).into_word(),
            addr(0xbb).into_word(),
        ];
        let amount = U256::from(1_500_000_000_000_000_000u64);
        let values = decode_log(transfer, &topics, &amount.to_be_bytes::<32>()).unwrap();
        assert_eq!(values.address("from").unwrap(), addr(0xaa));
        assert_eq!(values.address("to").unwrap(), addr(0xbb));
        assert_eq!(values.uint("amount").unwrap(), amount);
        assert_eq!(values.uint("from"), Err(AbiError::MissingValue("from".into())));
    }

    #[test]
    fn test_decode_rejects_wrong_topic() {
        let abi = parse_interface(BANK_ABI).unwrap();
        let deposit = event(&abi, "Deposit").unwrap();
        let transfer_topic = event(&abi, "Transfer").unwrap().selector();
        assert_eq!(
            decode_log(deposit, &[transfer_topic, B256::ZERO], &[0u8; 32]).unwrap_err(),
            AbiError::TopicMismatch("Deposit".into())
        );
    }

    #[test]
    fn test_decode_rejects_missing_indexed_topic() {
        let abi = parse_interface(BANK_ABI).unwrap();
        let deposit = event(&abi, "Deposit").unwrap();
        assert!(decode_log(deposit, &[deposit.selector()], &[0u8; 32]).is_err());
    }
}
