//! Fake data builders for testing.

use serde_json::json;

use crate::entities::{Deposit, SkyBlocks, WavesBlock};

/// Fake skycoin explorer metadata for a chain whose head is at the given `seq`.
pub fn sky_blockchain_metadata(seq: u64) -> serde_json::Value {
    json!({
        "head": {
            "seq": seq,
            "block_hash": format!("head-{seq}"),
            "previous_block_hash": format!("head-{}", seq.saturating_sub(1)),
            "timestamp": 1477295242,
            "fee": 20732,
            "version": 0,
            "body_hash": "37f1111bd83d9c995b9e48511bd52de3b0e440dccbf6d2cfd41dee31a10f1aa4"
        },
        "unspents": 2,
        "unconfirmed": 0
    })
}

/// Fake skycoin explorer block list json, with one block of one transaction holding two outputs.
pub fn sky_blocks_json(seq: u64, hash: &str) -> serde_json::Value {
    json!({
        "blocks": [
            {
                "header": {
                    "version": 0,
                    "timestamp": 1477295242,
                    "seq": seq,
                    "fee": 20732,
                    "prev_hash": "f680fe1f068a1cd5c3ef9194f91a9bc3cacffbcae4a32359a3c014da4ef7516f",
                    "hash": hash
                },
                "body": {
                    "txns": [
                        {
                            "length": 608,
                            "type": 0,
                            "txid": format!("txid-{hash}"),
                            "inner_hash": "37f1111bd83d9c995b9e48511bd52de3b0e440dccbf6d2cfd41dee31a10f1aa4",
                            "sigs": [
                                "ef0b8e1465557e6f21cb2bfad17136188f0b9bd54bba3db76c3488eb8bc900bc7662e3fe162dd6c236d9e52a7051a2133855081a91f6c1a63e1fce2ae9e3820e00"
                            ],
                            "inputs": [
                                "4bd7c68ecf3039c2b2d8c26a5e2983e20cf53b6d62b099e7786546b3c3f600f9"
                            ],
                            "outputs": [
                                {
                                    "uxid": "574d7e5afaefe4ee7e0adf6ce1971d979f038adc8ebbd35771b2c19b0bad7e3d",
                                    "dst": "cBnu9sUvv12dovBmjQKTtfE4rbjMmf3fzW",
                                    "coins": "1",
                                    "hours": 3455
                                },
                                {
                                    "uxid": "6d8a9c89177ce5e9d3b4b59fff67c00f0471fdebdfbb368377841b03fc7d688b",
                                    "dst": "fyqX5YuwXMUs4GEUE3LjLyhrqvNztFHQ4B",
                                    "coins": "5",
                                    "hours": 3455
                                }
                            ]
                        }
                    ]
                }
            }
        ]
    })
}

/// Fake skycoin block list, see [sky_blocks_json].
pub fn sky_blocks(seq: u64, hash: &str) -> SkyBlocks {
    serde_json::from_value(sky_blocks_json(seq, hash)).expect("fake sky blocks should be valid")
}

/// Fake waves `blocks/last` json: a block with a genesis like transaction and a transfer.
pub fn waves_block_json(height: u64, signature: &str) -> serde_json::Value {
    json!({
        "version": 3,
        "timestamp": 1528892325155_u64,
        "reference": "4SPSbuS1F8c6bJQ3nStDLWjGp6ASRnAcgEuAKd1WNCEQsnJMwp26Adc3NTj1aTVWL5JKmoT9ZRXLFj6nmcuuQ5Ss",
        "nxt-consensus": {
            "base-target": 70,
            "generation-signature": "8uYZW8tN2Q8u8S6xkHu9iFuZMnD3rbYgLeV1wU1VYNdu"
        },
        "features": [],
        "generator": "3P9DEDP5VbyXQyKtXDUt2crRPn5B7gs6ujc",
        "signature": signature,
        "blocksize": 609,
        "transactionCount": 2,
        "fee": 200000,
        "height": height,
        "transactions": [
            {
                "type": 8,
                "id": format!("lease-{signature}"),
                "sender": "3PMj3yGPBEa1Sx9X4TSBFeJCMMaE3wvKR4N",
                "fee": 100000,
                "timestamp": 1528892323374_u64
            },
            {
                "type": 4,
                "id": format!("transfer-{signature}"),
                "sender": "3PMj3yGPBEa1Sx9X4TSBFeJCMMaE3wvKR4N",
                "senderPublicKey": "ACrdghi6PDpLn1dVRH4VZQBoANxnsYGhozdD2cyrgFf",
                "fee": 100000,
                "timestamp": 1528892324107_u64,
                "recipient": "3PBWXDFUc86N2EQxKJmW8eFco65xTyMZx6J",
                "assetId": null,
                "amount": 100000000,
                "feeAsset": null,
                "attachment": ""
            }
        ]
    })
}

/// Fake waves block, see [waves_block_json].
pub fn waves_block(height: u64, signature: &str) -> WavesBlock {
    serde_json::from_value(waves_block_json(height, signature))
        .expect("fake waves block should be valid")
}

/// Fake skycoin deposit
pub fn sky_deposit() -> Deposit {
    Deposit::new("1FeDtFhARLxjKUPPkQqEBL78tisenc9znS", 10000, 3455, "SKY")
}

/// Fake waves deposit
pub fn waves_deposit() -> Deposit {
    Deposit::new("3PFnbq8kQjYyPwHMaSnbyQ78t15uU6nbkqi", 560100000000, 0, "WAVES")
}
