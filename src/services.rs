pub mod stock_service;
pub use stock_service::StockService;
pub mod recipe_service;
pub use recipe_service::RecipeService;
pub mod product_service;
pub use product_service::ProductService;
pub mod report_service;
pub use report_service::ReportService;
pub mod analysis_service;
pub use analysis_service::AnalysisService;
