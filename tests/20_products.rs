mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn product_crud_roundtrip() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };
    let client = reqwest::Client::new();
    let sku = common::unique("WID");
    let product = json!({"name": "Widget", "sku": sku, "quantity": 10});

    let res = client.post(server.url("/products")).json(&product).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let auth = common::login_fresh_user(server, &client).await?;

    let res = client
        .post(server.url("/products"))
        .header("Authorization", &auth)
        .json(&product)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await?;
    let id = created["data"]["id"].as_str().unwrap_or_default().to_string();

    let res = client.get(server.url(&format!("/products/{}", id))).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let fetched: Value = res.json().await?;
    assert_eq!(fetched["data"]["sku"], sku.as_str());
    assert_eq!(fetched["data"]["quantity"], 10);

    let res = client
        .post(server.url("/products"))
        .header("Authorization", &auth)
        .json(&product)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let uri = server.url(&format!("/products/{}", id));
    let res = client.delete(&uri).header("Authorization", &auth).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let res = client.delete(&uri).header("Authorization", &auth).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn category_in_use_cannot_be_deleted() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };
    let client = reqwest::Client::new();
    let auth = common::login_fresh_user(server, &client).await?;

    let res = client
        .post(server.url("/categories"))
        .header("Authorization", &auth)
        .json(&json!({"name": "Tools"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let category: Value = res.json().await?;
    let category_id = category["data"]["id"].as_str().unwrap_or_default().to_string();

    let res = client
        .post(server.url("/products"))
        .header("Authorization", &auth)
        .json(&json!({
            "name": "Hammer",
            "sku": common::unique("HAM"),
            "quantity": 3,
            "category_id": category_id
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let product: Value = res.json().await?;
    assert_eq!(product["data"]["category_name"], "Tools");

    let category_uri = server.url(&format!("/categories/{}", category_id));
    let res = client.delete(&category_uri).header("Authorization", &auth).send().await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let product_uri = server.url(&format!(
        "/products/{}",
        product["data"]["id"].as_str().unwrap_or_default()
    ));
    let res = client.delete(&product_uri).header("Authorization", &auth).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.delete(&category_uri).header("Authorization", &auth).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn customers_require_unique_email() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };
    let client = reqwest::Client::new();
    let auth = common::login_fresh_user(server, &client).await?;
    let customer = json!({
        "name": "Budi",
        "email": format!("{}@example.com", common::unique("budi")),
        "phone": "0812-555"
    });

    let res = client
        .post(server.url("/customers"))
        .header("Authorization", &auth)
        .json(&customer)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .post(server.url("/customers"))
        .header("Authorization", &auth)
        .json(&customer)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = client.get(server.url("/customers")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}
