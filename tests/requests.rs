#[cfg(test)]
mod tests {
    use num_bigint::BigInt;
    use serde_json::{Value, json};
    use toysig::request::{DsaSignRequest, DsaVerifyRequest, EcdsaSignRequest, EcdsaVerifyRequest};
    use toysig::{EngineConfig, dsa_sign, dsa_verify, ecdsa_sign, ecdsa_verify};

    const SECP256K1_P: &str =
        "115792089237316195423570985008687907853269984665640564039457584007908834671663";
    const SECP256K1_N: &str =
        "115792089237316195423570985008687907852837564279074904382605163141518161494337";
    const SECP256K1_GX: &str =
        "55066263022277343669578718895168534326250603453777594175500187360389116729240";
    const SECP256K1_GY: &str =
        "32670510020758816978083085130507043184471273380659243275938904335757337482424";

    #[test]
    fn test_integers_from_numbers_and_strings() {
        let from_numbers: DsaSignRequest = serde_json::from_value(json!({
            "p": 23, "q": 11, "g": 4, "x": 3, "k": 7, "message": "hi"
        }))
        .unwrap();
        let from_strings: DsaSignRequest = serde_json::from_value(json!({
            "p": "23", "q": " 11", "g": "4", "x": "3", "k": "7", "message": "hi"
        }))
        .unwrap();
        assert_eq!(from_numbers, from_strings);
        assert_eq!(from_numbers.q, BigInt::from(11));
    }

    #[test]
    fn test_malformed_requests_fail_to_deserialize() {
        let missing = serde_json::from_value::<DsaSignRequest>(json!({
            "p": 23, "q": 11, "g": 4, "x": 3, "message": "hi"
        }));
        assert!(missing.is_err());

        let not_an_integer = serde_json::from_value::<DsaSignRequest>(json!({
            "p": 23, "q": 11, "g": 4, "x": "three", "k": 7, "message": "hi"
        }));
        assert!(not_an_integer.is_err());

        let fractional = serde_json::from_value::<DsaSignRequest>(json!({
            "p": 23, "q": 11, "g": 4, "x": 3.5, "k": 7, "message": "hi"
        }));
        assert!(fractional.is_err());
    }

    #[test]
    fn test_dsa_sign_then_verify_through_requests() {
        let request: DsaSignRequest = serde_json::from_str(
            r#"{"p": 23, "q": 11, "g": 4, "x": 3, "k": 7, "message": "hi"}"#,
        )
        .unwrap();
        let signed = dsa_sign(&request);
        let out = signed.value().unwrap();

        let verify: DsaVerifyRequest = serde_json::from_value(json!({
            "p": 23, "q": 11, "g": 4,
            "y": out.public_key.to_string(),
            "r": out.signature.r.to_string(),
            "s": out.signature.s.to_string(),
            "message": "hi"
        }))
        .unwrap();
        assert!(dsa_verify(&verify).value().unwrap().valid);
    }

    #[test]
    fn test_success_serialization_shape() {
        let request: DsaSignRequest = serde_json::from_value(json!({
            "p": 23, "q": 11, "g": 4, "x": 3, "k": 7, "message": "hi"
        }))
        .unwrap();
        let value = serde_json::to_value(dsa_sign(&request)).unwrap();

        assert_eq!(value["status"], "success");
        assert_eq!(value["signature"], json!({ "r": "8", "s": "6" }));
        assert_eq!(value["public_key"], "18");
        assert!(value["warning"].as_str().unwrap().starts_with("EDUCATIONAL MODE ONLY"));

        let steps = value["steps"].as_array().unwrap();
        assert_eq!(steps.len(), 5);
        assert_eq!(steps[0]["index"], 1);
        assert_eq!(steps[0]["stage"]["kind"], "public_key");
        assert_eq!(steps[2]["stage"], json!({ "kind": "r", "source": "8", "r": "8" }));
    }

    #[test]
    fn test_error_serialization_keeps_steps() {
        let request: EcdsaSignRequest = serde_json::from_value(json!({
            "a": 2, "b": 3, "p": 97, "Gx": 3, "Gy": 6, "n": 5, "d": 3, "k": 5, "message": "Hello"
        }))
        .unwrap();
        let value = serde_json::to_value(ecdsa_sign(&request, &EngineConfig::default())).unwrap();

        assert_eq!(value["status"], "error");
        assert_eq!(value["kind"], "point_at_infinity");
        assert_eq!(value["message"], "k × G resulted in the point at infinity");

        let steps = value["steps"].as_array().unwrap();
        assert_eq!(steps.len(), 4);
        assert_eq!(steps[0]["index"], 0);
        let last = &steps[3]["stage"];
        assert_eq!(last["kind"], "scalar_multiply");
        assert_eq!(last["result"], "infinity");
        assert_eq!(last["bits"]["binary"], "101");
    }

    #[test]
    fn test_out_of_range_component_serialization() {
        let request: DsaVerifyRequest = serde_json::from_value(json!({
            "p": 283, "q": 47, "g": 60, "y": 158, "r": 0, "s": 1, "message": "m43"
        }))
        .unwrap();
        let value = serde_json::to_value(dsa_verify(&request)).unwrap();

        assert_eq!(value["status"], "success");
        assert_eq!(value["valid"], false);
        assert_eq!(value["out_of_range"], "r");
        assert_eq!(
            value["steps"][0]["stage"],
            json!({ "kind": "range_check", "component": "r", "value": "0", "order": "47" })
        );
    }

    #[test]
    fn test_invalid_modulus_is_rejected_without_steps() {
        let request: DsaSignRequest = serde_json::from_value(json!({
            "p": 23, "q": 0, "g": 4, "x": 3, "k": 7, "message": "hi"
        }))
        .unwrap();
        let traced = dsa_sign(&request);
        assert!(traced.trace.is_empty());

        let value = serde_json::to_value(&traced).unwrap();
        assert_eq!(value["kind"], "invalid_modulus");
        assert_eq!(value["steps"], json!([]));
    }

    #[test]
    fn test_ecdsa_requests_accept_large_strings() {
        let config = EngineConfig::default().with_scalar_step_preview(2);
        let request: EcdsaSignRequest = serde_json::from_value(json!({
            "a": 0, "b": 7, "p": SECP256K1_P,
            "Gx": SECP256K1_GX, "Gy": SECP256K1_GY, "n": SECP256K1_N,
            "d": "12648430", "k": "1311768467294899695",
            "message": "arbitrary precision"
        }))
        .unwrap();
        let signed = ecdsa_sign(&request, &config);
        let out = signed.value().unwrap();

        let (qx, qy) = (out.public_key.x().unwrap(), out.public_key.y().unwrap());
        let verify: EcdsaVerifyRequest = serde_json::from_value(json!({
            "a": 0, "b": 7, "p": SECP256K1_P,
            "Gx": SECP256K1_GX, "Gy": SECP256K1_GY, "n": SECP256K1_N,
            "Qx": qx.to_string(), "Qy": qy.to_string(),
            "r": out.signature.r.to_string(), "s": out.signature.s.to_string(),
            "message": "arbitrary precision"
        }))
        .unwrap();
        let verified = ecdsa_verify(&verify, &config);
        assert!(verified.value().unwrap().valid);

        let value = serde_json::to_value(&verified).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["valid"], true);
        let scalar_steps: Vec<&Value> = value["steps"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|s| s["stage"]["kind"] == "scalar_multiply")
            .collect();
        assert_eq!(scalar_steps.len(), 2);
        for step in scalar_steps {
            assert!(step["stage"]["bits"]["steps"].as_array().unwrap().len() <= 2);
        }
    }

    #[test]
    fn test_config_defaults_when_fields_are_missing() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        let config: EngineConfig = serde_json::from_str(r#"{"scalar_step_preview": 0}"#).unwrap();
        assert_eq!(config.scalar_step_preview, 0);
    }
}
