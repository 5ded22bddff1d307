pub mod sales;

pub use sales::{
    category_sales, top_products, AdminMetrics, CategoryRevenueRow, CategorySales,
    HeadlineMetrics, ProductSalesRow, TopProduct,
};
