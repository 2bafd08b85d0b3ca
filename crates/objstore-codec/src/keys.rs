//! Wire key names. These exact strings are part of the client contract.

pub const UID: &str = "UID";
pub const KIND: &str = "kind";
pub const VERSION: &str = "version";
pub const UPDATED: &str = "updated";
pub const UPDATED_BY: &str = "updatedBy";
pub const CREATED: &str = "created";
pub const CREATED_BY: &str = "createdBy";
pub const BODY: &str = "body";
pub const BODY_BASE64: &str = "body_base64";
pub const ETAG: &str = "etag";
pub const SIZE: &str = "size";
pub const SYNC: &str = "sync";

pub const SOURCE: &str = "source";
pub const TIME: &str = "time";

pub const NAME: &str = "name";
pub const DESCRIPTION: &str = "description";
pub const LABELS: &str = "labels";
pub const ERROR: &str = "error";
pub const FIELDS: &str = "fields";

pub const OBJECT: &str = "object";
pub const SUMMARY: &str = "summary";
pub const STATUS: &str = "status";

pub const CODE: &str = "code";
pub const MESSAGE: &str = "message";
pub const DETAILS: &str = "details";

pub const RESULTS: &str = "results";
pub const VERSIONS: &str = "versions";
pub const NEXT_PAGE_TOKEN: &str = "next_page_token";
pub const UPDATED_BY_SNAKE: &str = "updated_by";
pub const COMMENT: &str = "comment";
