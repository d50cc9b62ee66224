pub mod app_context;
pub mod edit;
pub mod layout;
pub mod store;

pub use app_context::AppContext;
pub use edit::{EditState, NameDraft, PromptDraft, PromptField};
pub use layout::{Divider, PaneLayout};
pub use store::{reduce, Action, AppState, Selection, Store, StoreSubscription};
