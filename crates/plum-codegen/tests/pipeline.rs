use std::sync::Arc;

use plum_codegen::{Document, Generator, GeneratorConfig, MemoryStructureSource};
use serde_json::{Value, json};

fn generator(source: MemoryStructureSource) -> Generator {
    Generator::with_structure_source(GeneratorConfig::default(), Arc::new(source))
}

fn doudian_payload(title: &str, content: Value) -> String {
    json!({
        "code": 0,
        "data": {"article": {"info": {"title": title}, "content": content.to_string()}}
    })
    .to_string()
}

fn order_detail() -> String {
    doudian_payload(
        "/order/detail",
        json!({
            "request": {"requestParam": [
                {"requestName": "order_id", "type": 2, "mustNeed": true, "description": "订单号"},
                {"requestName": "page", "type": 1, "description": "【可选】页码"},
                {"requestName": "receiver", "type": 5, "mustNeed": false, "description": "收件人",
                 "children": [{"requestName": "name", "type": 2, "mustNeed": true, "description": "姓名"}]}
            ]},
            "response": {"responseData": []}
        }),
    )
}

#[tokio::test]
async fn test_python_output() {
    let lines = generator(MemoryStructureSource::new())
        .generate("doudian", "Python", &order_detail())
        .await;
    insta::assert_snapshot!(lines.join("\n"), @r#"
    from typing import Optional
    from pydantic import Field


    class Receiver(BaseModel):
        name: str = Field(..., description="姓名")


    class OrderDetailParam(TopParamBase):
        order_id: str = Field(..., description="订单号")
        page: Optional[int] = Field(default=None, description="【可选】页码")
        receiver: Optional[Receiver] = Field(default=None, description="收件人")


    class OrderDetailResponse(TopResponseBase):
        pass


    class OrderDetailRequest(TopRequestBase):
        method: str = "order.detail"
        param: OrderDetailParam
    "#);
}

#[tokio::test]
async fn test_typescript_output() {
    let lines = generator(MemoryStructureSource::new())
        .generate("doudian", "typescript", &order_detail())
        .await;
    insta::assert_snapshot!(lines.join("\n"), @r#"
    interface Receiver extends BaseModel {
        /** description: 姓名 */
        name: string;
    }

    interface OrderDetailParam extends TopParamBase {
        /** description: 订单号 */
        order_id: string;
        /** description: 【可选】页码 */
        page?: number | null;
        /** description: 收件人 */
        receiver?: Receiver | null;
    }

    interface OrderDetailResponse extends TopResponseBase {
    }

    type OrderDetailRequest = TopRequestBase & {
        method: "order.detail";
        param: OrderDetailParam;
    };
    "#);
}

fn taobao_payload() -> String {
    json!({
        "success": true,
        "data": {
            "name": "taobao.trade.get",
            "requestParams": [{"name": "tid", "type": "Number", "required": true}],
            "responseParams": [
                {"name": "trade", "type": "Trade", "subParams": [
                    {"name": "orders", "type": "Order[]", "subParams": [{"name": "oid", "type": "Long"}]},
                    {"name": "buyer", "type": "Address", "subParams": [{"name": "city", "type": "String"}]},
                    {"name": "seller", "type": "Address", "subParams": [{"name": "zip", "type": "Long"}]}
                ]}
            ]
        }
    })
    .to_string()
}

fn kuaishou_payload() -> String {
    json!({
        "status": 200,
        "data": {
            "name": "open.item.get",
            "inputParams": [{"paramName": "itemId", "paramType": "Long", "required": true, "children": null}],
            "outputParams": [{"paramName": "skus", "paramType": "List<String>"}]
        }
    })
    .to_string()
}

fn alipay_payload() -> String {
    let request = json!([
        {"value": {"fieldName": "out_trade_no", "exactType": "String", "fieldType": "SIMPLETYPE", "mustType": "MUST"}},
        {"value": {"fieldName": "goods", "exactType": "Goods", "fieldType": "COMPLEXTYPE", "listType": true},
         "children": [{"value": {"fieldName": "goods_id", "exactType": "String", "fieldType": "SIMPLETYPE"}}]}
    ]);
    let text = json!({"apiData": {"name": "alipay.trade.pay", "requestParamList": request.to_string()}})
        .to_string();
    json!({"stat": "ok", "data": {"content": {"text": text}}}).to_string()
}

fn alibaba_payload() -> String {
    json!({
        "success": true,
        "result": {
            "name": "alibaba.trade.get",
            "apiAppParamVOList": [{"name": "orderId", "type": "java.lang.Long", "required": true}],
            "apiReturnParamVOList": [
                {"name": "result", "type": "com.alibaba.trade.TradeInfo", "complexTypeFlag": true,
                 "children": [{"name": "price", "type": "java.lang.Double"}]}
            ]
        }
    })
    .to_string()
}

fn weixin_document() -> Document {
    Document::new("https://developers.weixin.qq.com/doc/channels/API/order/get.html")
        .with_block(
            "接口调用请求说明",
            "http请求方式：POST\nhttps://api.weixin.qq.com/channels/ec/order/get?access_token=ACCESS_TOKEN",
        )
        .with_table(
            "请求参数说明",
            vec![vec!["order_id", "string", "是", "订单ID"]],
        )
}

#[tokio::test]
async fn test_output_is_deterministic_for_every_vendor() {
    let generator = generator(MemoryStructureSource::new());
    let payloads = [
        ("doudian", order_detail()),
        ("taobao", taobao_payload()),
        ("kuaishou", kuaishou_payload()),
        ("alipay", alipay_payload()),
        ("alibaba", alibaba_payload()),
    ];
    for (vendor, payload) in &payloads {
        for language in ["Python", "TypeScript"] {
            let first = generator.generate(vendor, language, payload).await;
            let second = generator.generate(vendor, language, payload).await;
            assert_eq!(first, second, "{vendor} {language}");
            assert!(
                first.iter().any(|l| l.contains("Request")),
                "{vendor} {language}: {first:#?}"
            );
        }
    }

    let document = weixin_document();
    let first = generator.generate_by_document("weixin", "Python", &document).await;
    let second = generator.generate_by_document("weixin", "Python", &document).await;
    assert_eq!(first, second);
    assert!(first.contains(&"class ChannelsEcOrderGetRequest(WopRequestBase):".to_string()));
}

#[tokio::test]
async fn test_null_member_lists_still_generate() {
    let lines = generator(MemoryStructureSource::new())
        .generate("kuaishou", "Python", &kuaishou_payload())
        .await;
    assert!(lines.contains(&"    item_id: int = Field(..., description=\"\", alias=\"itemId\")".to_string()));
    assert!(!lines.iter().any(|l| l.starts_with("# invalid JSON")));
}

#[tokio::test]
async fn test_failed_envelope_is_a_single_comment() {
    let generator = generator(MemoryStructureSource::new());
    let lines = generator
        .generate("doudian", "Python", r#"{"code": 500, "data": null}"#)
        .await;
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("# "));

    let lines = generator.generate("doudian", "TypeScript", "not json").await;
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("/** invalid JSON payload"));
}

#[tokio::test]
async fn test_unknown_vendor_and_language() {
    let generator = generator(MemoryStructureSource::new());
    let lines = generator.generate("shopify", "TypeScript", "{}").await;
    assert_eq!(lines, vec!["/** unknown vendor: shopify */"]);

    let lines = generator.generate("doudian", "Go", "{}").await;
    assert_eq!(lines, vec!["# unsupported language: Go"]);
}

#[tokio::test]
async fn test_identical_nested_models_collapse() {
    let payload = json!({
        "success": true,
        "data": {
            "name": "taobao.logistics.get",
            "requestParams": [],
            "responseParams": [
                {"name": "from", "type": "Address", "subParams": [{"name": "city", "type": "String"}]},
                {"name": "to", "type": "Address", "subParams": [{"name": "city", "type": "String"}]}
            ]
        }
    })
    .to_string();
    let generator = generator(MemoryStructureSource::new());
    let vendor = generator.vendor("taobao").unwrap();
    let data = generator.parse(vendor, &payload, None).await.unwrap();

    let names: Vec<&str> = data.responses.iter().map(|m| m.class_name.as_str()).collect();
    assert_eq!(names, vec!["Address", "TaobaoLogisticsGetResponse"]);
    let root = &data.responses[1];
    assert_eq!(root.child_params[0].type_name, "Address");
    assert_eq!(root.child_params[1].type_name, "Address");
}

#[tokio::test]
async fn test_structure_lookup_feeds_generation() {
    let source = MemoryStructureSource::new().with(
        "7",
        json!({"success": true, "data": {"subParams": [{"name": "title", "type": "String", "required": true}]}}),
    );
    let payload = json!({
        "success": true,
        "data": {
            "name": "taobao.item.get",
            "requestParams": [],
            "responseParams": [{"name": "item", "type": "Item", "structureId": 7}]
        }
    })
    .to_string();
    let lines = generator(source).generate("taobao", "Python", &payload).await;
    assert!(lines.contains(&"class Item(BaseModel):".to_string()));
    assert!(lines.contains(&"    title: str = Field(..., description=\"\")".to_string()));
}

#[tokio::test]
async fn test_alipay_price_bound() {
    let field = json!({"value": {
        "fieldName": "total_amount",
        "exactType": "Price",
        "fieldType": "SIMPLETYPE",
        "mustType": "MUST",
        "maxLength": 5
    }});
    let text = json!({"apiData": {
        "name": "alipay.trade.pay",
        "requestParamList": json!([field]).to_string()
    }})
    .to_string();
    let payload = json!({"stat": "ok", "data": {"content": {"text": text}}}).to_string();

    let lines = generator(MemoryStructureSource::new())
        .generate("alipay", "Python", &payload)
        .await;
    assert!(
        lines
            .iter()
            .any(|l| l.starts_with("    total_amount: float = Field(...") && l.contains("le=100")),
        "{lines:#?}"
    );
}

#[tokio::test]
async fn test_weixin_missing_type_table_becomes_comment() {
    let document = Document::new("https://developers.weixin.qq.com/doc/channels/API/order/get.html")
        .with_block(
            "接口调用请求说明",
            "http请求方式：POST\nhttps://api.weixin.qq.com/channels/ec/order/get?access_token=ACCESS_TOKEN",
        )
        .with_table("返回参数说明", vec![vec!["order", "Object Order", "订单"]]);

    let lines = generator(MemoryStructureSource::new())
        .generate_by_document("weixin", "Python", &document)
        .await;
    assert_eq!(lines, vec!["# 未找到 返回参数说明 中的 Order 数据"]);
}

#[tokio::test]
async fn test_one_shot_generate() {
    let lines = plum_codegen::generate(
        "doudian",
        "Python",
        &order_detail(),
        &GeneratorConfig::default(),
    )
    .await;
    assert_eq!(lines.last().map(String::as_str), Some("    param: OrderDetailParam"));
}
