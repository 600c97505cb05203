use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// A simulated inbound payment to inject in the next synthesized block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Deposit {
    /// Destination address
    #[serde(alias = "address")]
    pub address: String,

    /// Amount, in the smallest unit of the coin
    #[serde(alias = "value")]
    pub value: i64,

    /// Secondary unit (coin hours for skycoin)
    #[serde(default, alias = "hours")]
    pub hours: u64,

    /// Coin type selecting the provider
    #[serde(alias = "coin_type", alias = "cointype")]
    pub coin_type: String,
}

impl Deposit {
    /// Deposit constructor
    pub fn new<A: Into<String>, C: Into<String>>(
        address: A,
        value: i64,
        hours: u64,
        coin_type: C,
    ) -> Self {
        Self {
            address: address.into(),
            value,
            hours,
            coin_type: coin_type.into(),
        }
    }
}

impl Display for Deposit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{Address: {}, Value: {}, Hours: {}, CoinType: {}}}",
            self.address, self.value, self.hours, self.coin_type
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_node_field_names() {
        let deposit: Deposit = serde_json::from_str(
            r#"{"Address":"1FeDtFhARLxjKUPPkQqEBL78tisenc9znS","Value":10000,"Hours":3455,"CoinType":"SKY"}"#,
        )
        .unwrap();

        assert_eq!(
            Deposit::new("1FeDtFhARLxjKUPPkQqEBL78tisenc9znS", 10000, 3455, "SKY"),
            deposit
        );
    }

    #[test]
    fn deserialize_lower_case_aliases_and_default_hours() {
        let deposit: Deposit = serde_json::from_str(
            r#"{"address":"3PFnbq8kQjYyPwHMaSnbyQ78t15uU6nbkqi","value":560100000000,"cointype":"WAVES"}"#,
        )
        .unwrap();

        assert_eq!(0, deposit.hours);
        assert_eq!("WAVES", deposit.coin_type);
    }

    #[test]
    fn display_names_every_field() {
        let deposit = Deposit::new("addr", 12, 3, "ETH");

        assert_eq!(
            "{Address: addr, Value: 12, Hours: 3, CoinType: ETH}",
            deposit.to_string()
        );
    }
}
