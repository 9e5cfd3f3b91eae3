mod price_list;
mod promotion_list;
mod resource_table;

pub use price_list::PriceListView;
pub use promotion_list::PromotionListView;
