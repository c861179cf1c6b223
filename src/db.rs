pub mod inventory_repo;
pub use inventory_repo::InventoryRepository;
pub mod purchase_repo;
pub use purchase_repo::PurchaseRepository;
pub mod recipe_repo;
pub use recipe_repo::RecipeRepository;
pub mod product_repo;
pub use product_repo::ProductRepository;
