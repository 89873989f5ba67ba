//! Prefixed ID constants.
//!
//! IDs are `{prefix}-{8 hex chars}`, e.g. `tsk-a3f8b2c1`. The random part is
//! produced by the store; these prefixes only tag the entity kind.

pub const PREFIX_PROJECT: &str = "prj";
pub const PREFIX_MILESTONE: &str = "mst";
pub const PREFIX_TASK: &str = "tsk";
pub const PREFIX_TICKET: &str = "tkt";
pub const PREFIX_TEMPLATE: &str = "tpl";
pub const PREFIX_TEMPLATE_MILESTONE: &str = "tpm";
pub const PREFIX_TEMPLATE_TASK: &str = "tpt";
pub const PREFIX_USER: &str = "usr";
pub const PREFIX_NOTIFICATION: &str = "ntf";
pub const PREFIX_AUDIT: &str = "aud";

pub const ALL_PREFIXES: &[&str] = &[
    PREFIX_PROJECT,
    PREFIX_MILESTONE,
    PREFIX_TASK,
    PREFIX_TICKET,
    PREFIX_TEMPLATE,
    PREFIX_TEMPLATE_MILESTONE,
    PREFIX_TEMPLATE_TASK,
    PREFIX_USER,
    PREFIX_NOTIFICATION,
    PREFIX_AUDIT,
];
