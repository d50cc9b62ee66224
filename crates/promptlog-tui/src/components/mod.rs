pub mod dialogs;
pub mod editor;
pub mod header;
pub mod prompt_list;
pub mod search_overlay;
pub mod toast;
pub mod tree;

pub use dialogs::{ConfirmDialog, InputDialog, InputPurpose, SettingsAction, SettingsDialog};
pub use editor::PromptEditor;
pub use header::Header;
pub use prompt_list::{PromptList, PromptListState};
pub use search_overlay::SearchOverlayView;
pub use toast::ToastTray;
pub use tree::{flatten, ProjectTree, ProjectTreeState, TreeRow};
