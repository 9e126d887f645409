mod advisory;
mod overrides;
mod package;

pub use advisory::{Advisory, AuditDiff, AuditReport};
pub use overrides::{OverrideMap, RemovedOverrides};
pub use package::{encode_uri_component, package_name};
