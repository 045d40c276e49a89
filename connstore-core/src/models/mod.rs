//! Core data models: connection profiles and their groups

mod group;
mod profile;

pub use group::{
    GROUP_NAME_SEPARATOR, GroupRecord, ROOT_GROUP_ID, ROOT_GROUP_NAME, join_full_name,
    normalize_group_name, same_group_name, split_full_name,
};
pub use profile::{
    AuthenticationType, ConnectionProfile, ID_SEPARATOR, IdentityScope, NAME_VALUE_SEPARATOR,
    PASSWORD_OPTION, PROVIDER_PROPERTY,
};
