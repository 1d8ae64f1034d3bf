use chrono::{Duration as ChronoDuration, Local, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{json, Value};

use verdicomply_api::AppConfig;
use verdicomply_auth::{JwtClaims, Role};

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with(test_config()).await
    }

    async fn spawn_with(config: AppConfig) -> Self {
        // Same router as prod over the in-memory store, bound to an ephemeral port.
        let app = verdicomply_api::build_app(&config)
            .await
            .expect("failed to build app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn login(&self, username: &str, password: &str) -> String {
        let res = self
            .client
            .post(self.url("/api/public/auth/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }

    async fn get(&self, token: &str, path: &str) -> (StatusCode, Value) {
        let res = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn send(&self, method: reqwest::Method, token: &str, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self
            .client
            .request(method, self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn put(&self, token: &str, path: &str, body: Value) -> (StatusCode, Value) {
        self.send(reqwest::Method::PUT, token, path, body).await
    }

    async fn post(&self, token: &str, path: &str, body: Value) -> (StatusCode, Value) {
        self.send(reqwest::Method::POST, token, path, body).await
    }

    async fn delete(&self, token: &str, path: &str) -> StatusCode {
        self.client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap()
            .status()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        jwt_secret: JWT_SECRET.to_string(),
        argon2_memory_kib: 1024,
        argon2_iterations: 1,
        ..AppConfig::default()
    }
}

fn mint_jwt(roles: Vec<Role>, expires_in: ChronoDuration) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: "tester".to_string(),
        roles,
        iat: now.timestamp(),
        exp: (now + expires_in).timestamp(),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_returns_bearer_token_with_authorities() {
    let srv = TestServer::spawn().await;

    let res = srv
        .client
        .post(srv.url("/api/public/auth/login"))
        .json(&json!({ "username": "admin", "password": "admin" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["tipo"], "Bearer");
    assert_eq!(body["username"], "admin");
    assert_eq!(body["roles"], json!(["ROLE_ADMIN"]));
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn bad_credentials_return_token_shaped_401() {
    let srv = TestServer::spawn().await;

    let res = srv
        .client
        .post(srv.url("/api/public/auth/login"))
        .json(&json!({ "username": "admin", "password": "wrong" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["tipo"], "erro");
    assert!(body["token"].is_null());
    assert_eq!(body["username"], "admin");
    assert_eq!(body["roles"], json!([]));
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/api/normas")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], 401);
    assert_eq!(body["erro"], "Não autorizado");
    assert_eq!(body["path"], "/api/normas");
}

#[tokio::test]
async fn expired_and_foreign_tokens_are_rejected() {
    let srv = TestServer::spawn().await;

    let expired = mint_jwt(vec![Role::Admin], ChronoDuration::minutes(-5));
    let (status, _) = srv.get(&expired, "/api/normas").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let foreign = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &json!({ "sub": "x", "roles": ["ROLE_ADMIN"], "iat": 0, "exp": 4_102_444_800i64 }),
        &EncodingKey::from_secret(b"another-secret"),
    )
    .unwrap();
    let (status, _) = srv.get(&foreign, "/api/normas").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn minted_token_grants_its_roles() {
    let srv = TestServer::spawn().await;

    let auditor = mint_jwt(vec![Role::Auditor], ChronoDuration::minutes(10));
    let (status, body) = srv.get(&auditor, "/api/normas").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 5);

    let (status, body) = srv.get(&auditor, "/api/auditorias").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["erro"], "Acesso negado");
    assert_eq!(body["mensagem"], "Você não tem permissão para acessar este recurso");
}

#[tokio::test]
async fn compliance_workflow_end_to_end() {
    let srv = TestServer::spawn().await;
    let admin = srv.login("admin", "admin").await;
    let gestor = srv.login("gestor", "gestor").await;
    let auditor = srv.login("auditor", "auditor").await;

    let (status, departments) = srv.get(&auditor, "/api/departamentos").await;
    assert_eq!(status, StatusCode::OK);
    let department_id = departments[0]["id"].as_i64().unwrap();

    let (status, norm) = srv.get(&auditor, "/api/normas/codigo/ISO-14001").await;
    assert_eq!(status, StatusCode::OK);
    let norm_id = norm["id"].as_i64().unwrap();

    let today = Local::now().date_naive();
    let (status, audit) = srv
        .post(
            &gestor,
            "/api/auditorias",
            json!({
                "departamentoId": department_id,
                "dataAuditoria": today.to_string(),
                "auditorResponsavel": "Ana Souza",
                "statusAuditoria": "EM_ANDAMENTO",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(audit["departamento"]["id"], department_id);
    let audit_id = audit["id"].as_i64().unwrap();

    let (status, found) = srv.get(&auditor, "/api/auditorias/status/andamento").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found.as_array().unwrap().len(), 1);

    let (status, record) = srv
        .post(
            &auditor,
            "/api/conformidades",
            json!({
                "auditoriaId": audit_id,
                "normaAmbientalId": norm_id,
                "estaConforme": "N",
                "observacao": "Sem plano de gestão ambiental",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(record["auditoria"]["auditorResponsavel"], "Ana Souza");
    assert_eq!(record["normaAmbiental"]["codigoNorma"], "ISO-14001");
    let compliance_id = record["id"].as_i64().unwrap();

    let (_, non_compliant) = srv.get(&auditor, "/api/conformidades/status/N").await;
    assert_eq!(non_compliant.as_array().unwrap().len(), 1);
    let (status, unknown) = srv.get(&auditor, "/api/conformidades/status/X").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unknown, json!([]));

    let yesterday = today - ChronoDuration::days(1);
    let (status, item) = srv
        .post(
            &auditor,
            "/api/pendencias",
            json!({
                "conformidadeId": compliance_id,
                "descricao": "Elaborar plano de gestão",
                "prazoResolucao": yesterday.to_string(),
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(item["resolvida"], "N");
    assert_eq!(item["conformidade"]["id"], compliance_id);

    let (status, overdue) = srv.get(&gestor, "/api/pendencias/vencidas").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(overdue.as_array().unwrap().len(), 1);
    let (_, overdue_earlier) = srv
        .get(&gestor, &format!("/api/pendencias/vencidas?data={}", yesterday))
        .await;
    assert_eq!(overdue_earlier, json!([]));
    let (status, _) = srv.get(&auditor, "/api/pendencias/vencidas").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    for (action, day) in [("ABERTURA", yesterday), ("REVISAO", today)] {
        let (status, _) = srv
            .post(
                &auditor,
                "/api/logs",
                json!({
                    "conformidadeId": compliance_id,
                    "acao": action,
                    "dataRegistro": day.to_string(),
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (status, logs) = srv
        .get(&auditor, &format!("/api/logs/conformidade/{}", compliance_id))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(logs[0]["acao"], "REVISAO");
    assert_eq!(logs[1]["acao"], "ABERTURA");

    // Children block the delete of their parent.
    let res = srv
        .client
        .delete(srv.url(&format!("/api/conformidades/{}", compliance_id)))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["erro"], "Violação de integridade");
    assert_eq!(
        body["mensagem"],
        "Não é possível excluir este registro pois existem outros registros vinculados a ele"
    );

    assert_eq!(
        srv.delete(&gestor, &format!("/api/auditorias/{}", audit_id)).await,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        srv.delete(&admin, &format!("/api/pendencias/{}", item["id"])).await,
        StatusCode::NO_CONTENT
    );
}

#[tokio::test]
async fn validation_errors_list_fields() {
    let srv = TestServer::spawn().await;
    let gestor = srv.login("gestor", "gestor").await;

    let (status, body) = srv
        .post(&gestor, "/api/auditorias", json!({ "auditorResponsavel": "" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["erro"], "Erro de validação");
    assert_eq!(body["path"], "/api/auditorias");
    assert_eq!(
        body["campos"],
        json!([
            { "campo": "auditorResponsavel", "mensagem": "O auditor responsável é obrigatório" },
            { "campo": "departamentoId", "mensagem": "O departamento é obrigatório" },
        ])
    );

    let (status, body) = srv
        .post(
            &gestor,
            "/api/auditorias",
            json!({ "departamentoId": 1, "dataAuditoria": "10/05/2024", "auditorResponsavel": "Ana" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["erro"], "Erro de formato de dados");
    assert_eq!(body["mensagem"], "Formato de data inválido. Use o formato: YYYY-MM-DD");
}

#[tokio::test]
async fn missing_records_and_bad_ids() {
    let srv = TestServer::spawn().await;
    let auditor = srv.login("auditor", "auditor").await;

    let (status, body) = srv.get(&auditor, "/api/conformidades/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["erro"], "Recurso não encontrado");
    assert_eq!(body["mensagem"], "Conformidade não encontrada");

    let (status, body) = srv.get(&auditor, "/api/pendencias/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["erro"], "Requisição inválida");
}

#[tokio::test]
async fn norms_reject_duplicate_codes() {
    let srv = TestServer::spawn().await;
    let gestor = srv.login("gestor", "gestor").await;

    let (status, created) = srv
        .post(
            &gestor,
            "/api/normas",
            json!({ "codigoNorma": "RES-430", "titulo": "Efluentes", "orgaoFiscalizador": "CONAMA" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["codigoNorma"], "RES-430");

    let (status, body) = srv
        .post(&gestor, "/api/normas", json!({ "codigoNorma": "RES-430" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["mensagem"], "Já existe uma norma com o mesmo código");

    let (_, by_agency) = srv.get(&gestor, "/api/normas/orgao/CONAMA").await;
    assert!(by_agency
        .as_array()
        .unwrap()
        .iter()
        .any(|n| n["codigoNorma"] == "RES-430"));
}

#[tokio::test]
async fn registration_creates_accounts_once() {
    let srv = TestServer::spawn().await;

    let res = srv
        .client
        .post(srv.url("/api/public/registro"))
        .json(&json!({ "username": "carla", "password": "segredo1", "role": "GESTOR" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["role"], "GESTOR");
    assert_eq!(body["mensagem"], "Usuário registrado com sucesso");

    let token = srv.login("carla", "segredo1").await;
    let (status, _) = srv.get(&token, "/api/pendencias/vencidas").await;
    assert_eq!(status, StatusCode::OK);

    let res = srv
        .client
        .post(srv.url("/api/public/registro"))
        .json(&json!({ "username": "carla", "password": "outra123", "role": "ADMIN" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["mensagem"], "Nome de usuário já existe");

    let res = srv
        .client
        .post(srv.url("/api/public/registro"))
        .json(&json!({ "username": "dora", "password": "segredo1", "role": "ROOT" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["campos"][0]["mensagem"], "O perfil deve ser ADMIN, GESTOR ou AUDITOR");
}

#[tokio::test]
async fn lookups_by_missing_parent_are_not_found() {
    let srv = TestServer::spawn().await;
    let gestor = srv.login("gestor", "gestor").await;

    for (path, message) in [
        ("/api/auditorias/departamento/999", "Departamento não encontrado"),
        ("/api/conformidades/auditoria/999", "Auditoria não encontrada"),
        ("/api/conformidades/norma/999", "Norma ambiental não encontrada"),
        ("/api/pendencias/conformidade/999", "Conformidade não encontrada"),
        ("/api/logs/conformidade/999", "Conformidade não encontrada"),
    ] {
        let (status, body) = srv.get(&gestor, path).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{path}");
        assert_eq!(body["mensagem"], message, "{path}");
        assert_eq!(body["path"], path);
    }

    // An existing parent without children is an empty list.
    let (_, departments) = srv.get(&gestor, "/api/departamentos").await;
    let department_id = departments[0]["id"].as_i64().unwrap();
    let (status, audits) = srv
        .get(&gestor, &format!("/api/auditorias/departamento/{}", department_id))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(audits, json!([]));
}

#[tokio::test]
async fn department_crud_respects_roles() {
    let srv = TestServer::spawn().await;
    let admin = srv.login("admin", "admin").await;
    let gestor = srv.login("gestor", "gestor").await;
    let auditor = srv.login("auditor", "auditor").await;

    let (status, _) = srv
        .post(&auditor, "/api/departamentos", json!({ "nomeDepartamento": "Qualidade" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, created) = srv
        .post(&gestor, "/api/departamentos", json!({ "nomeDepartamento": "Qualidade" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();

    let (status, renamed) = srv
        .put(
            &gestor,
            &format!("/api/departamentos/{}", id),
            json!({ "nomeDepartamento": "Qualidade Ambiental" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed, json!({ "id": id, "nomeDepartamento": "Qualidade Ambiental" }));

    let (status, body) = srv
        .put(&gestor, "/api/departamentos/999", json!({ "nomeDepartamento": "Nada" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["mensagem"], "Departamento não encontrado");

    let (status, body) = srv
        .post(&gestor, "/api/departamentos", json!({ "nomeDepartamento": "" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["campos"][0]["campo"], "nomeDepartamento");

    assert_eq!(
        srv.delete(&gestor, &format!("/api/departamentos/{}", id)).await,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        srv.delete(&admin, &format!("/api/departamentos/{}", id)).await,
        StatusCode::NO_CONTENT
    );
    let (status, _) = srv.get(&auditor, &format!("/api/departamentos/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(srv.delete(&admin, "/api/departamentos/999").await, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn updates_overwrite_existing_records() {
    let srv = TestServer::spawn().await;
    let gestor = srv.login("gestor", "gestor").await;
    let auditor = srv.login("auditor", "auditor").await;

    let (_, departments) = srv.get(&auditor, "/api/departamentos").await;
    let department_id = departments[0]["id"].as_i64().unwrap();
    let other_department_id = departments[1]["id"].as_i64().unwrap();
    let (_, norm) = srv.get(&auditor, "/api/normas/codigo/NBR-10004").await;
    let norm_id = norm["id"].as_i64().unwrap();

    let (_, audit) = srv
        .post(
            &gestor,
            "/api/auditorias",
            json!({
                "departamentoId": department_id,
                "dataAuditoria": "2024-03-01",
                "auditorResponsavel": "Ana Souza",
                "statusAuditoria": "PLANEJADA",
            }),
        )
        .await;
    let audit_id = audit["id"].as_i64().unwrap();

    let (status, audit) = srv
        .put(
            &gestor,
            &format!("/api/auditorias/{}", audit_id),
            json!({
                "departamentoId": other_department_id,
                "dataAuditoria": "2024-03-02",
                "auditorResponsavel": "Bruno Lima",
                "statusAuditoria": "CONCLUIDA",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(audit["id"], audit_id);
    assert_eq!(audit["departamento"]["id"], other_department_id);
    assert_eq!(audit["statusAuditoria"], "CONCLUIDA");

    let (status, _) = srv
        .put(
            &auditor,
            &format!("/api/auditorias/{}", audit_id),
            json!({
                "departamentoId": department_id,
                "dataAuditoria": "2024-03-02",
                "auditorResponsavel": "Bruno Lima",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = srv
        .put(
            &gestor,
            "/api/auditorias/999",
            json!({
                "departamentoId": department_id,
                "dataAuditoria": "2024-03-02",
                "auditorResponsavel": "Bruno Lima",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["mensagem"], "Auditoria não encontrada");

    let (_, record) = srv
        .post(
            &auditor,
            "/api/conformidades",
            json!({ "auditoriaId": audit_id, "normaAmbientalId": norm_id, "estaConforme": "N" }),
        )
        .await;
    let compliance_id = record["id"].as_i64().unwrap();
    let (status, record) = srv
        .put(
            &auditor,
            &format!("/api/conformidades/{}", compliance_id),
            json!({
                "auditoriaId": audit_id,
                "normaAmbientalId": norm_id,
                "estaConforme": "S",
                "observacao": "Corrigido",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["estaConforme"], "S");
    let (_, compliant) = srv.get(&auditor, "/api/conformidades/status/S").await;
    assert_eq!(compliant.as_array().unwrap().len(), 1);

    let (_, item) = srv
        .post(
            &auditor,
            "/api/pendencias",
            json!({
                "conformidadeId": compliance_id,
                "descricao": "Destinar resíduos",
                "prazoResolucao": "2024-04-01",
            }),
        )
        .await;
    let item_id = item["id"].as_i64().unwrap();
    let (status, item) = srv
        .put(
            &auditor,
            &format!("/api/pendencias/{}", item_id),
            json!({
                "conformidadeId": compliance_id,
                "descricao": "Destinar resíduos",
                "prazoResolucao": "2024-04-01",
                "resolvida": "S",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["resolvida"], "S");
    let (_, overdue) = srv.get(&gestor, "/api/pendencias/vencidas").await;
    assert_eq!(overdue, json!([]));

    let (status, body) = srv
        .put(
            &auditor,
            "/api/pendencias/999",
            json!({
                "conformidadeId": compliance_id,
                "descricao": "Nada",
                "prazoResolucao": "2024-04-01",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["mensagem"], "Pendência não encontrada");
}

#[tokio::test]
async fn norm_update_cannot_take_another_code() {
    let srv = TestServer::spawn().await;
    let gestor = srv.login("gestor", "gestor").await;

    let (_, norm) = srv.get(&gestor, "/api/normas/codigo/LEI-9605").await;
    let norm_id = norm["id"].as_i64().unwrap();

    let (status, body) = srv
        .put(
            &gestor,
            &format!("/api/normas/{}", norm_id),
            json!({ "codigoNorma": "ISO-14001", "titulo": "Outra" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["mensagem"], "Já existe uma norma com o mesmo código");

    let (status, updated) = srv
        .put(
            &gestor,
            &format!("/api/normas/{}", norm_id),
            json!({ "codigoNorma": "LEI-9605", "titulo": "Lei de Crimes Ambientais", "severidade": "Média" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], norm_id);
    assert_eq!(updated["severidade"], "Média");

    let (status, body) = srv
        .put(&gestor, "/api/normas/999", json!({ "codigoNorma": "NOVA-1" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["mensagem"], "Norma ambiental não encontrada");
}

#[tokio::test]
async fn log_listing_is_for_managers_only() {
    let srv = TestServer::spawn().await;
    let gestor = srv.login("gestor", "gestor").await;
    let auditor = srv.login("auditor", "auditor").await;

    let (status, _) = srv.get(&auditor, "/api/logs").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = srv.get(&auditor, "/api/logs/1").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = srv.get(&auditor, "/api/logs/acao/ABERTURA").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, logs) = srv.get(&gestor, "/api/logs").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(logs, json!([]));
    let (status, body) = srv.get(&gestor, "/api/logs/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["mensagem"], "Log de conformidade não encontrado");
}

#[tokio::test]
async fn cors_preflight_and_exposed_headers() {
    let srv = TestServer::spawn().await;

    let res = srv
        .client
        .request(reqwest::Method::OPTIONS, srv.url("/api/normas"))
        .header("Origin", "http://painel.example")
        .header("Access-Control-Request-Method", "PUT")
        .header("Access-Control-Request-Headers", "authorization,content-type")
        .send()
        .await
        .unwrap();
    assert!(res.status().is_success());
    let headers = res.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(headers["access-control-max-age"], "3600");
    let methods = headers["access-control-allow-methods"].to_str().unwrap();
    for method in ["GET", "POST", "PUT", "DELETE", "OPTIONS"] {
        assert!(methods.contains(method), "{methods}");
    }

    let res = srv
        .client
        .get(srv.url("/health"))
        .header("Origin", "http://painel.example")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let exposed = res.headers()["access-control-expose-headers"].to_str().unwrap();
    assert!(exposed.eq_ignore_ascii_case("authorization"), "{exposed}");
}

#[tokio::test]
async fn custom_token_header_and_prefix_are_honoured() {
    let srv = TestServer::spawn_with(AppConfig {
        jwt_header: "X-Auth-Token".to_string(),
        jwt_prefix: "Token ".to_string(),
        ..test_config()
    })
    .await;
    let token = srv.login("auditor", "auditor").await;

    let res = srv
        .client
        .get(srv.url("/api/normas"))
        .header("X-Auth-Token", format!("Token {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // The default header is ignored once another one is configured.
    let (status, body) = srv.get(&token, "/api/normas").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["erro"], "Não autorizado");

    let res = srv
        .client
        .get(srv.url("/api/normas"))
        .header("X-Auth-Token", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
