//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod group;
pub mod post;
pub mod user;
pub mod pagination;

pub use validation::{FormErrors, ValidationError};
pub use group::{GroupDescription, GroupSlug, GroupTitle, NewGroup};
pub use post::{truncate_display, PostForm, PostInput, PostText, SHOW_CHARS};
pub use user::{NewPassword, Username};
pub use pagination::{Paginated, Pagination, PaginationParams, OBJECTS_PER_PAGE};
