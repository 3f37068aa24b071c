//! Operator action commands.
//!
//! Every actionable row in a rendered view carries its command encoded as a
//! single whitespace-delimited string: the command name followed by its
//! positional arguments. [`ActionRequest`] is the checked form of that string.
//! Parsing is strict; an unknown command, a wrong argument count, or an
//! unusable price is rejected before anything reaches the gateway.

use crate::error::ActionParseError;
use crate::Category;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const CANCEL_BID: &str = "cancel-bid";
pub const START: &str = "start";
pub const SNAPSHOT: &str = "snapshot";
pub const TERMINATE: &str = "terminate";

/// Placeholder encoded for a missing argument value (e.g. no public address).
pub const ABSENT: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum ActionRequest {
    CancelBid {
        request_id: String,
        instance_type: String,
    },
    Start {
        instance_type: String,
        price: String,
        zone: String,
        image_id: String,
        key_name: String,
        security_group_id: String,
    },
    Snapshot {
        instance_id: String,
        instance_type: String,
        address: String,
    },
    Terminate {
        instance_id: String,
        instance_type: String,
        address: String,
    },
}

impl ActionRequest {
    pub fn command_name(&self) -> &'static str {
        match self {
            ActionRequest::CancelBid { .. } => CANCEL_BID,
            ActionRequest::Start { .. } => START,
            ActionRequest::Snapshot { .. } => SNAPSHOT,
            ActionRequest::Terminate { .. } => TERMINATE,
        }
    }

    /// Category whose cached value is stale once this action succeeds.
    pub fn invalidates(&self) -> Category {
        match self {
            ActionRequest::CancelBid { .. } | ActionRequest::Start { .. } => {
                Category::SpotRequests
            }
            ActionRequest::Snapshot { .. } => Category::Images,
            ActionRequest::Terminate { .. } => Category::Instances,
        }
    }

    /// Question put to the operator before the action runs.
    pub fn prompt(&self) -> String {
        match self {
            ActionRequest::CancelBid {
                request_id,
                instance_type,
            } => format!("Cancel spot request {} ({})?", request_id, instance_type),
            ActionRequest::Start {
                instance_type,
                price,
                zone,
                image_id,
                ..
            } => format!(
                "Bid {} for a {} in {} from image {}?",
                price, instance_type, zone, image_id
            ),
            ActionRequest::Snapshot {
                instance_id,
                instance_type,
                address,
            } => format!(
                "Snapshot {} ({} at {}) into a new image?",
                instance_id, instance_type, address
            ),
            ActionRequest::Terminate {
                instance_id,
                instance_type,
                address,
            } => format!(
                "Terminate {} ({} at {})? This cannot be undone.",
                instance_id, instance_type, address
            ),
        }
    }

    fn args(&self) -> Vec<&str> {
        match self {
            ActionRequest::CancelBid {
                request_id,
                instance_type,
            } => vec![request_id.as_str(), instance_type.as_str()],
            ActionRequest::Start {
                instance_type,
                price,
                zone,
                image_id,
                key_name,
                security_group_id,
            } => vec![
                instance_type.as_str(),
                price.as_str(),
                zone.as_str(),
                image_id.as_str(),
                key_name.as_str(),
                security_group_id.as_str(),
            ],
            ActionRequest::Snapshot {
                instance_id,
                instance_type,
                address,
            }
            | ActionRequest::Terminate {
                instance_id,
                instance_type,
                address,
            } => vec![instance_id.as_str(), instance_type.as_str(), address.as_str()],
        }
    }
}

fn expect_arity(
    command: &'static str,
    args: &[&str],
    expected: usize,
) -> Result<(), ActionParseError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(ActionParseError::Arity {
            command,
            expected,
            got: args.len(),
        })
    }
}

fn parse_price(value: &str) -> Result<String, ActionParseError> {
    match value.parse::<f64>() {
        Ok(price) if price.is_finite() && price > 0.0 => Ok(value.to_string()),
        _ => Err(ActionParseError::InvalidArgument {
            command: START,
            field: "price",
            value: value.to_string(),
        }),
    }
}

impl FromStr for ActionRequest {
    type Err = ActionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = s.split_whitespace();
        let command = tokens.next().ok_or(ActionParseError::Empty)?;
        let args: Vec<&str> = tokens.collect();
        let owned = |i: usize| args[i].to_string();

        match command {
            CANCEL_BID => {
                expect_arity(CANCEL_BID, &args, 2)?;
                Ok(ActionRequest::CancelBid {
                    request_id: owned(0),
                    instance_type: owned(1),
                })
            }
            START => {
                expect_arity(START, &args, 6)?;
                Ok(ActionRequest::Start {
                    instance_type: owned(0),
                    price: parse_price(args[1])?,
                    zone: owned(2),
                    image_id: owned(3),
                    key_name: owned(4),
                    security_group_id: owned(5),
                })
            }
            SNAPSHOT => {
                expect_arity(SNAPSHOT, &args, 3)?;
                Ok(ActionRequest::Snapshot {
                    instance_id: owned(0),
                    instance_type: owned(1),
                    address: owned(2),
                })
            }
            TERMINATE => {
                expect_arity(TERMINATE, &args, 3)?;
                Ok(ActionRequest::Terminate {
                    instance_id: owned(0),
                    instance_type: owned(1),
                    address: owned(2),
                })
            }
            other => Err(ActionParseError::UnknownCommand(other.to_string())),
        }
    }
}

impl fmt::Display for ActionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command_name())?;
        for arg in self.args() {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn token() -> impl Strategy<Value = String> {
        "[a-z0-9][a-z0-9.\\-]{0,15}"
    }

    fn arb_action() -> impl Strategy<Value = ActionRequest> {
        prop_oneof![
            (token(), token()).prop_map(|(request_id, instance_type)| ActionRequest::CancelBid {
                request_id,
                instance_type,
            }),
            (token(), 1u32..100_000u32, token(), token(), token(), token()).prop_map(
                |(instance_type, cents, zone, image_id, key_name, security_group_id)| {
                    ActionRequest::Start {
                        instance_type,
                        price: format!("{:.4}", cents as f64 / 10_000.0),
                        zone,
                        image_id,
                        key_name,
                        security_group_id,
                    }
                }
            ),
            (token(), token(), token()).prop_map(|(instance_id, instance_type, address)| {
                ActionRequest::Snapshot {
                    instance_id,
                    instance_type,
                    address,
                }
            }),
            (token(), token(), token()).prop_map(|(instance_id, instance_type, address)| {
                ActionRequest::Terminate {
                    instance_id,
                    instance_type,
                    address,
                }
            }),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Property: an encoded action parses back to itself
        #[test]
        fn prop_encoded_action_parses_back(action in arb_action()) {
            let encoded = action.to_string();
            prop_assert_eq!(encoded.parse::<ActionRequest>(), Ok(action));
        }

        /// Property: arbitrary input never panics the parser
        #[test]
        fn prop_parser_never_panics(input in "\\PC{0,80}") {
            let _ = input.parse::<ActionRequest>();
        }
    }
}
