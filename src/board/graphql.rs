//! GraphQL endpoint.
//!
//! Exposes the same operations as the REST surface through async-graphql:
//! `getBoard` plus one mutation per board operation. Failures carry
//! `extensions.code` (`NOT_FOUND`, `CONFLICT`, `VALIDATION`, `INTERNAL`).
//!
//! Endpoints:
//! - POST /graphql - execute queries and mutations
//! - GET /graphql - GraphiQL

use async_graphql::{
    Context, EmptySubscription, ErrorExtensions, ID, InputObject, Object, Result as GqlResult,
    Schema, SimpleObject,
};
use axum::{
    Json, Router,
    extract::State,
    response::{Html, IntoResponse},
    routing::get,
};
use chrono::{DateTime, Utc};

use super::api::SharedState;
use super::models::{Board, Card, CardMove, CardUpdate, Column, PositionUpdate};
use super::store::DbHandle;
use crate::errors::{BoardError, ErrorKind};

// ============================================================================
// GRAPHQL TYPES
// ============================================================================

#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "Card")]
pub struct GqlCard {
    pub id: ID,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub column_id: ID,
    pub position: i64,
    pub color: Option<String>,
}

impl From<Card> for GqlCard {
    fn from(c: Card) -> Self {
        Self {
            id: ID(c.id),
            title: c.title,
            description: c.description,
            created_at: c.created_at,
            column_id: ID(c.column_id),
            position: c.position,
            color: c.color,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "Column")]
pub struct GqlColumn {
    pub id: ID,
    pub title: String,
    pub position: i64,
    pub cards: Vec<GqlCard>,
}

impl From<Column> for GqlColumn {
    fn from(c: Column) -> Self {
        Self {
            id: ID(c.id),
            title: c.title,
            position: c.position,
            cards: c.cards.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "Board")]
pub struct GqlBoard {
    pub columns: Vec<GqlColumn>,
}

impl From<Board> for GqlBoard {
    fn from(b: Board) -> Self {
        Self {
            columns: b.columns.into_iter().map(Into::into).collect(),
        }
    }
}

// ============================================================================
// INPUT TYPES
// ============================================================================

#[derive(Debug, Clone, InputObject)]
pub struct CreateColumnInput {
    pub title: String,
}

#[derive(Debug, Clone, InputObject)]
pub struct PositionInput {
    pub id: ID,
    pub position: i64,
}

impl From<PositionInput> for PositionUpdate {
    fn from(p: PositionInput) -> Self {
        Self {
            id: p.id.0,
            position: p.position,
        }
    }
}

#[derive(Debug, Clone, InputObject)]
pub struct ColumnPositionsInput {
    pub columns: Vec<PositionInput>,
}

#[derive(Debug, Clone, InputObject)]
pub struct CreateCardInput {
    pub title: String,
    #[graphql(default)]
    pub description: String,
    pub column_id: ID,
}

#[derive(Debug, Clone, InputObject)]
pub struct MoveCardInput {
    pub card_id: ID,
    pub from_column_id: ID,
    pub to_column_id: ID,
    pub position: i64,
}

#[derive(Debug, Clone, InputObject)]
pub struct UpdateCardInput {
    pub id: ID,
    pub title: String,
    #[graphql(default)]
    pub description: String,
    pub color: Option<String>,
}

// ============================================================================
// ERRORS
// ============================================================================

fn gql_error(err: BoardError) -> async_graphql::Error {
    let code = match err.kind() {
        ErrorKind::NotFound => "NOT_FOUND",
        ErrorKind::Conflict => "CONFLICT",
        ErrorKind::Validation => "VALIDATION",
        ErrorKind::Internal => {
            tracing::error!(error = %err, "board operation failed");
            "INTERNAL"
        }
    };
    async_graphql::Error::new(err.to_string()).extend_with(|_, e| e.set("code", code))
}

// ============================================================================
// QUERY ROOT
// ============================================================================

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// The whole board, columns and cards in position order.
    async fn get_board(&self, ctx: &Context<'_>) -> GqlResult<GqlBoard> {
        let db = ctx.data::<DbHandle>()?;
        let board = db.call(|s| s.get_board()).await.map_err(gql_error)?;
        Ok(board.into())
    }
}

// ============================================================================
// MUTATION ROOT
// ============================================================================

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Append a column at the end of the board.
    async fn create_column(
        &self,
        ctx: &Context<'_>,
        input: CreateColumnInput,
    ) -> GqlResult<GqlColumn> {
        let db = ctx.data::<DbHandle>()?;
        let column = db
            .call(move |s| s.append_column(&input.title))
            .await
            .map_err(gql_error)?;
        Ok(column.into())
    }

    async fn update_column(&self, ctx: &Context<'_>, id: ID, title: String) -> GqlResult<GqlColumn> {
        let db = ctx.data::<DbHandle>()?;
        let column = db
            .call(move |s| s.update_column_title(&id, &title))
            .await
            .map_err(gql_error)?;
        Ok(column.into())
    }

    /// Delete a column and its cards.
    async fn delete_column(&self, ctx: &Context<'_>, column_id: ID) -> GqlResult<bool> {
        let db = ctx.data::<DbHandle>()?;
        db.call(move |s| s.delete_column(&column_id))
            .await
            .map_err(gql_error)?;
        Ok(true)
    }

    /// Write client-ordered column positions. Unknown ids are skipped.
    async fn update_column_positions(
        &self,
        ctx: &Context<'_>,
        input: ColumnPositionsInput,
    ) -> GqlResult<bool> {
        let db = ctx.data::<DbHandle>()?;
        let updates: Vec<PositionUpdate> = input.columns.into_iter().map(Into::into).collect();
        db.call(move |s| s.reposition_columns(&updates))
            .await
            .map_err(gql_error)?;
        Ok(true)
    }

    async fn move_column(&self, ctx: &Context<'_>, id: ID, position: i64) -> GqlResult<GqlColumn> {
        let db = ctx.data::<DbHandle>()?;
        let column = db
            .call(move |s| s.move_column(&id, position))
            .await
            .map_err(gql_error)?;
        Ok(column.into())
    }

    /// Append a card at the end of a column.
    async fn create_card(&self, ctx: &Context<'_>, input: CreateCardInput) -> GqlResult<GqlCard> {
        let db = ctx.data::<DbHandle>()?;
        let card = db
            .call(move |s| s.append_card(&input.column_id, &input.title, &input.description))
            .await
            .map_err(gql_error)?;
        Ok(card.into())
    }

    async fn delete_card(&self, ctx: &Context<'_>, card_id: ID) -> GqlResult<bool> {
        let db = ctx.data::<DbHandle>()?;
        db.call(move |s| s.delete_card(&card_id))
            .await
            .map_err(gql_error)?;
        Ok(true)
    }

    /// Move a card to another column (or within its own).
    async fn move_card(&self, ctx: &Context<'_>, input: MoveCardInput) -> GqlResult<bool> {
        let db = ctx.data::<DbHandle>()?;
        let mv = CardMove {
            from_column_id: input.from_column_id.0,
            to_column_id: input.to_column_id.0,
            position: input.position,
        };
        let card_id = input.card_id.0;
        db.call(move |s| s.move_card(&card_id, &mv))
            .await
            .map_err(gql_error)?;
        Ok(true)
    }

    async fn update_card_position(
        &self,
        ctx: &Context<'_>,
        card_id: ID,
        position: i64,
    ) -> GqlResult<bool> {
        let db = ctx.data::<DbHandle>()?;
        db.call(move |s| s.reposition_card(&card_id, position))
            .await
            .map_err(gql_error)?;
        Ok(true)
    }

    /// Write client-ordered card positions within one column. Returns the
    /// number of cards written.
    async fn update_card_positions(
        &self,
        ctx: &Context<'_>,
        column_id: ID,
        cards: Vec<PositionInput>,
    ) -> GqlResult<usize> {
        let db = ctx.data::<DbHandle>()?;
        let updates: Vec<PositionUpdate> = cards.into_iter().map(Into::into).collect();
        db.call(move |s| s.reposition_cards(&column_id, &updates))
            .await
            .map_err(gql_error)
    }

    async fn update_card(&self, ctx: &Context<'_>, input: UpdateCardInput) -> GqlResult<GqlCard> {
        let db = ctx.data::<DbHandle>()?;
        let update = CardUpdate {
            title: input.title,
            description: input.description,
            color: input.color,
        };
        let id = input.id.0;
        let card = db
            .call(move |s| s.update_card(&id, &update))
            .await
            .map_err(gql_error)?;
        Ok(card.into())
    }
}

// ============================================================================
// SCHEMA & HANDLERS
// ============================================================================

pub type BoardSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn create_schema(db: DbHandle) -> BoardSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(db)
        .finish()
}

pub async fn graphql_handler(
    State(state): State<SharedState>,
    Json(request): Json<async_graphql::Request>,
) -> Json<async_graphql::Response> {
    Json(state.schema.execute(request).await)
}

pub async fn graphiql_handler() -> impl IntoResponse {
    Html(
        async_graphql::http::GraphiQLSource::build()
            .endpoint("/graphql")
            .finish(),
    )
}

pub fn graphql_router() -> Router<SharedState> {
    Router::new().route("/graphql", get(graphiql_handler).post(graphql_handler))
}
