pub mod melee;
pub mod projectile;
