//! Categories for labelling expenses.

mod categories_page;
mod core;
mod create_endpoint;
mod delete_endpoint;

pub use categories_page::get_categories_page;
pub use core::{
    Category, CategoryId, CategoryStyle, DEFAULT_NEW_CATEGORY_COLOR, DEFAULT_NEW_CATEGORY_ICON,
    category_style, create_category, create_category_table, delete_category, list_categories,
    seed_default_categories,
};
pub use create_endpoint::create_category_endpoint;
pub use delete_endpoint::delete_category_endpoint;

#[cfg(test)]
pub(crate) use categories_page::CategoriesPageState;
#[cfg(test)]
pub(crate) use core::DEFAULT_CATEGORIES;
#[cfg(test)]
pub(crate) use create_endpoint::{CategoryForm, CreateCategoryState};
#[cfg(test)]
pub(crate) use delete_endpoint::DeleteCategoryState;
