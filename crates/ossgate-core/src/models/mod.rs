pub mod object;
pub mod setting;
pub mod storage_profile;
pub mod upload;

pub use object::ObjectEntry;
pub use setting::{SysSetting, SETTING_STATUS_ENABLED, STORAGE_SETTING_CODE};
pub use storage_profile::{StorageProfile, UpdateStorageSettingRequest};
pub use upload::{UploadFolder, UploadResult};
