// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::{common::error::AppError, config::AppState};

// Estrutura de dados ("claims") dentro do JWT emitido pelo provedor de sessão
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // e-mail do operador autenticado
    pub exp: usize,  // quando o token expira
}

// O middleware em si. Sem sessão ativa, nenhuma requisição passa daqui —
// o motor de transição nunca precisa checar autenticação de novo.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(TypedHeader(Authorization(bearer))) = bearer else {
        return Err(AppError::InvalidToken);
    };

    let token_data = decode::<Claims>(
        bearer.token(),
        &DecodingKey::from_secret(app_state.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::InvalidToken)?;

    // Insere a identidade nos "extensions" da requisição
    request
        .extensions_mut()
        .insert(AuthenticatedUser(token_data.claims.sub));
    Ok(next.run(request).await)
}

// Extrator para obter o operador autenticado diretamente nos handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub String);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::InvalidToken)
    }
}
