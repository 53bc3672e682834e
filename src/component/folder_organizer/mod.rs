//! 演員資料夾整理元件
//!
//! 將以別名命名的演員資料夾改為固定名稱，必要時與既有資料夾合併

mod folder_merger;
mod main;

pub use folder_merger::{FolderMerger, MergeStats};
pub use main::{FolderOrganizer, OrganizeResult, PendingRename};
