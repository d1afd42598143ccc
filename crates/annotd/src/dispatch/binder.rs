//! Positional argument binding.

use serde_json::Value;

use super::errors::ProtocolError;
use super::registry::ParamSpec;
use super::request::RequestArgs;

/// Binds request fields to `params`, preserving declaration order.
///
/// Supplied non-null fields win; otherwise the declared default is used.
/// The first required parameter without a value fails the whole binding.
pub(crate) fn bind_positional(
    action: &str,
    params: &[ParamSpec],
    args: &RequestArgs,
) -> Result<Vec<Value>, ProtocolError> {
    params
        .iter()
        .map(|param| {
            args.get(param.name())
                .or_else(|| param.default_value())
                .cloned()
                .ok_or_else(|| ProtocolError::missing_argument(action, param.name()))
        })
        .collect()
}
