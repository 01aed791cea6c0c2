pub mod card;
pub mod damage;
pub mod energy;
pub mod history;
pub mod rules;
