//! Entity module - Contains all SeaORM entity definitions for the catalog.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod attribute_option;
pub mod attribute_type;
pub mod price_history;
pub mod product;
pub mod variant;
pub mod variant_attribute;
pub mod variant_group;
pub mod variant_group_membership;

// Re-export specific types to avoid conflicts
pub use attribute_option::{
    Column as AttributeOptionColumn, Entity as AttributeOption, Model as AttributeOptionModel,
};
pub use attribute_type::{
    Column as AttributeTypeColumn, Datatype, Entity as AttributeType, Model as AttributeTypeModel,
};
pub use price_history::{
    ChangeType, Column as PriceHistoryColumn, Entity as PriceHistory, Model as PriceHistoryModel,
};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use variant::{Column as VariantColumn, Entity as Variant, Model as VariantModel};
pub use variant_attribute::{
    Column as VariantAttributeColumn, Entity as VariantAttribute, Model as VariantAttributeModel,
};
pub use variant_group::{
    Column as VariantGroupColumn, Entity as VariantGroup, Model as VariantGroupModel,
};
pub use variant_group_membership::{
    Column as MembershipColumn, Entity as VariantGroupMembership, Model as MembershipModel,
};
