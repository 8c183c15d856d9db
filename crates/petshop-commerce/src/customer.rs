//! Customer-side collaborator records: users and shipping addresses.
//!
//! Profile management and location reference data are owned by other
//! layers; the core only consumes these records when resolving a receiver
//! at checkout and when checking new-customer coupon eligibility.

use crate::ids::{AddressId, UserId};
use serde::{Deserialize, Serialize};

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Full display name.
    pub full_name: String,
    /// Contact phone number.
    pub phone_number: Option<String>,
    /// Contact email.
    pub email: Option<String>,
}

impl User {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            id: UserId::generate(),
            full_name: full_name.into(),
            phone_number: None,
            email: None,
        }
    }
}

/// A saved shipping address belonging to a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Address {
    /// Unique address identifier.
    pub id: AddressId,
    /// Owning user.
    pub user_id: UserId,
    /// Receiver name; falls back to the user's full name when unset.
    pub receiver_name: Option<String>,
    /// Receiver phone; falls back to the user's phone when unset.
    pub receiver_phone: Option<String>,
    /// Street address line.
    pub street: String,
    /// Ward name.
    pub ward: Option<String>,
    /// District name.
    pub district: Option<String>,
    /// Province or city name.
    pub province: Option<String>,
}

impl Address {
    pub fn new(user_id: UserId, street: impl Into<String>) -> Self {
        Self {
            id: AddressId::generate(),
            user_id,
            receiver_name: None,
            receiver_phone: None,
            street: street.into(),
            ward: None,
            district: None,
            province: None,
        }
    }

    /// Render the full one-line address.
    pub fn full_address(&self) -> String {
        let mut parts = vec![self.street.clone()];
        for part in [&self.ward, &self.district, &self.province] {
            if let Some(p) = part {
                parts.push(p.clone());
            }
        }
        parts.join(", ")
    }
}

/// The shipping receiver recorded on an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Receiver {
    /// Name of the person receiving the delivery.
    pub name: String,
    /// Contact phone number.
    pub phone: String,
    /// Full shipping address as a single line.
    pub shipping_address: String,
}

impl Receiver {
    /// Build a receiver from a saved address, filling gaps from the
    /// owning user's profile.
    pub fn from_address(address: &Address, user: &User) -> Self {
        Self {
            name: address
                .receiver_name
                .clone()
                .unwrap_or_else(|| user.full_name.clone()),
            phone: address
                .receiver_phone
                .clone()
                .or_else(|| user.phone_number.clone())
                .unwrap_or_default(),
            shipping_address: address.full_address(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_address_joins_present_parts() {
        let user_id = UserId::new("u1");
        let mut address = Address::new(user_id, "12 Nguyen Trai");
        address.district = Some("Thanh Xuan".to_string());
        address.province = Some("Ha Noi".to_string());
        assert_eq!(address.full_address(), "12 Nguyen Trai, Thanh Xuan, Ha Noi");
    }

    #[test]
    fn test_receiver_falls_back_to_user_profile() {
        let mut user = User::new("Tran Minh");
        user.phone_number = Some("0901234567".to_string());
        let address = Address::new(user.id.clone(), "12 Nguyen Trai");

        let receiver = Receiver::from_address(&address, &user);
        assert_eq!(receiver.name, "Tran Minh");
        assert_eq!(receiver.phone, "0901234567");
    }

    #[test]
    fn test_receiver_prefers_address_overrides() {
        let user = User::new("Tran Minh");
        let mut address = Address::new(user.id.clone(), "12 Nguyen Trai");
        address.receiver_name = Some("Le Thu".to_string());
        address.receiver_phone = Some("0987654321".to_string());

        let receiver = Receiver::from_address(&address, &user);
        assert_eq!(receiver.name, "Le Thu");
        assert_eq!(receiver.phone, "0987654321");
    }
}
