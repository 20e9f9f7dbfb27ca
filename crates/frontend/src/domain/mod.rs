pub mod a001_materials;
pub mod a002_service_orders;
