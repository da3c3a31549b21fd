mod commands;
mod paths;
mod remediation;

pub use commands::CommandUpdateTrigger;
pub use paths::{AppPaths, AppPathsError};
pub use remediation::{
    FallbackRemediation, NativeUpdate, NativeUpdateTrigger, OpenStoreListing,
    app_store_listing_url,
};
