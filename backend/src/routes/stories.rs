use crate::{
    content::{Narrative, PersonaSelection},
    error::AppError,
    extractors::AdminSession,
    inflight::InFlight,
    models::{CoverType, Persona, Story},
    params::StoryParams,
    profile::get_profile,
    stories::{self, StoryDetail, StoryInput, StoryListItem},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

#[derive(Serialize)]
pub struct StoryCard {
    id: Uuid,
    title: String,
    cover_url: Option<String>,
    cover_type: CoverType,
    author_persona: Persona,
    story_date: Option<NaiveDate>,
    location: Option<String>,
    created: DateTime<Utc>,
}

impl From<Story> for StoryCard {
    fn from(story: Story) -> Self {
        Self {
            id: story.id,
            title: story.title,
            cover_url: story.cover_url,
            cover_type: story.cover_type,
            author_persona: story.author_persona,
            story_date: story.story_date,
            location: story.location,
            created: story.created_at,
        }
    }
}

pub async fn get_stories(
    State(pool): State<SqlitePool>,
    Query(params): Query<StoryParams>,
) -> Result<Json<Vec<StoryCard>>, AppError> {
    let stories = stories::list_published(&pool, &params).await?;
    Ok(Json(stories.into_iter().map(StoryCard::from).collect()))
}

#[derive(Deserialize)]
pub struct StoryViewParams {
    pub persona: Option<Persona>,
}

#[derive(Serialize)]
pub struct PublicStory {
    #[serde(flatten)]
    detail: StoryDetail,
    author_name: String,
    narrative: Narrative,
}

/// A published story with the selected side rendered, `him` unless asked.
pub async fn get_one_story(
    State(pool): State<SqlitePool>,
    Path(id): Path<Uuid>,
    Query(params): Query<StoryViewParams>,
) -> Result<Json<PublicStory>, AppError> {
    let detail = stories::get_published(&pool, id).await?;
    let profile = get_profile(&pool).await?;

    let mut selection = PersonaSelection::default();
    if let Some(persona) = params.persona {
        selection.select(persona);
    }
    Ok(Json(PublicStory {
        author_name: profile.name(detail.story.author_persona).to_string(),
        narrative: selection.render(&detail.content),
        detail,
    }))
}

pub async fn admin_list_stories(
    State(pool): State<SqlitePool>,
    _admin: AdminSession,
) -> Result<Json<Vec<StoryListItem>>, AppError> {
    Ok(Json(stories::list_admin(&pool).await?))
}

pub async fn admin_get_story(
    State(pool): State<SqlitePool>,
    _admin: AdminSession,
    Path(id): Path<Uuid>,
) -> Result<Json<StoryDetail>, AppError> {
    Ok(Json(stories::get_story(&pool, id).await?))
}

// Without an explicit author the story is told by whoever is writing it.
fn with_default_author(mut input: StoryInput, admin: &AdminSession) -> StoryInput {
    if input.author_persona.is_none() {
        input.author_persona = admin.persona;
    }
    input
}

pub async fn create_story(
    State(pool): State<SqlitePool>,
    State(inflight): State<InFlight>,
    admin: AdminSession,
    Json(payload): Json<StoryInput>,
) -> Result<(StatusCode, Json<StoryDetail>), AppError> {
    let _guard = inflight.begin(format!("story:create:{}", admin.identity.id))?;
    let story = stories::create_story(&pool, with_default_author(payload, &admin)).await?;
    Ok((StatusCode::CREATED, Json(story)))
}

pub async fn update_story(
    State(pool): State<SqlitePool>,
    State(inflight): State<InFlight>,
    admin: AdminSession,
    Path(id): Path<Uuid>,
    Json(payload): Json<StoryInput>,
) -> Result<Json<StoryDetail>, AppError> {
    let _guard = inflight.begin(format!("story:{}", id))?;
    let story = stories::update_story(&pool, id, with_default_author(payload, &admin)).await?;
    Ok(Json(story))
}

#[derive(Deserialize)]
pub struct PublishParams {
    pub published: Option<bool>,
}

/// Sets publication when `published` is given, toggles it otherwise.
pub async fn publish_story(
    State(pool): State<SqlitePool>,
    State(inflight): State<InFlight>,
    _admin: AdminSession,
    Path(id): Path<Uuid>,
    Query(params): Query<PublishParams>,
) -> Result<Json<StoryListItem>, AppError> {
    let _guard = inflight.begin(format!("story:{}", id))?;
    let story = match params.published {
        Some(published) => stories::set_published(&pool, id, published).await?,
        None => stories::toggle_published(&pool, id).await?,
    };
    Ok(Json(StoryListItem {
        status: stories::StoryStatus::of(&story),
        story,
    }))
}

pub async fn delete_story(
    State(pool): State<SqlitePool>,
    State(inflight): State<InFlight>,
    _admin: AdminSession,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let _guard = inflight.begin(format!("story:{}", id))?;
    stories::delete_story(&pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AppState;
    use crate::config::AppConfig;
    use crate::content::ContentPair;
    use crate::db::test_pool;
    use crate::stories::{MediaChanges, StoryStatus};

    async fn admin(state: &AppState, persona: Option<Persona>) -> AdminSession {
        let identity = state
            .identities
            .create_identity("ela@example.com", "segredo123")
            .await
            .unwrap();
        AdminSession { identity, persona }
    }

    fn input(author: Option<Persona>) -> StoryInput {
        StoryInput {
            title: "Primeiro encontro".to_string(),
            author_persona: author,
            is_published: false,
            cover_url: None,
            cover_type: CoverType::Image,
            story_date: None,
            location: None,
            content: ContentPair::default(),
            media: MediaChanges::default(),
        }
    }

    #[tokio::test]
    async fn create_falls_back_to_the_writers_persona() {
        let state = AppState::new(test_pool().await, AppConfig::for_tests());
        let session = admin(&state, Some(Persona::Her)).await;

        let (status, Json(story)) = create_story(
            State(state.db.clone()),
            State(state.inflight.clone()),
            session,
            Json(input(None)),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(story.story.author_persona, Persona::Her);
    }

    #[tokio::test]
    async fn create_without_any_persona_is_rejected() {
        let state = AppState::new(test_pool().await, AppConfig::for_tests());
        let session = admin(&state, None).await;

        let result = create_story(
            State(state.db.clone()),
            State(state.inflight.clone()),
            session,
            Json(input(None)),
        )
        .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn duplicate_save_while_in_flight_conflicts() {
        let state = AppState::new(test_pool().await, AppConfig::for_tests());
        let session = admin(&state, Some(Persona::Him)).await;
        let id = Uuid::new_v4();

        let _running = state.inflight.begin(format!("story:{}", id)).unwrap();
        let result = update_story(
            State(state.db.clone()),
            State(state.inflight.clone()),
            session,
            Path(id),
            Json(input(Some(Persona::Him))),
        )
        .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn publish_toggles_or_sets() {
        let state = AppState::new(test_pool().await, AppConfig::for_tests());
        let identity = admin(&state, None).await.identity;
        let session = || AdminSession {
            identity: identity.clone(),
            persona: None,
        };
        let created = stories::create_story(&state.db, input(Some(Persona::Him)))
            .await
            .unwrap();
        let id = created.story.id;

        let Json(toggled) = publish_story(
            State(state.db.clone()),
            State(state.inflight.clone()),
            session(),
            Path(id),
            Query(PublishParams { published: None }),
        )
        .await
        .unwrap();
        assert_eq!(toggled.status, StoryStatus::Published);

        let Json(public) = get_stories(State(state.db.clone()), Query(StoryParams::default()))
            .await
            .unwrap();
        assert_eq!(public.len(), 1);

        let Json(set) = publish_story(
            State(state.db.clone()),
            State(state.inflight.clone()),
            session(),
            Path(id),
            Query(PublishParams {
                published: Some(false),
            }),
        )
        .await
        .unwrap();
        assert_eq!(set.status, StoryStatus::Draft);
        assert!(matches!(
            get_one_story(
                State(state.db.clone()),
                Path(id),
                Query(StoryViewParams { persona: None }),
            )
            .await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn public_story_renders_placeholder_for_missing_half() {
        let state = AppState::new(test_pool().await, AppConfig::for_tests());
        let mut published = input(Some(Persona::Her));
        published.is_published = true;
        published.content = ContentPair::new(Some("dele".to_string()), None);
        let id = stories::create_story(&state.db, published)
            .await
            .unwrap()
            .story
            .id;

        let Json(default_side) = get_one_story(
            State(state.db.clone()),
            Path(id),
            Query(StoryViewParams { persona: None }),
        )
        .await
        .unwrap();
        assert_eq!(default_side.narrative.persona, Persona::Him);
        assert_eq!(default_side.narrative.text, "dele");
        assert!(!default_side.narrative.is_placeholder);
        assert_eq!(default_side.author_name, "Ela");

        let Json(her_side) = get_one_story(
            State(state.db.clone()),
            Path(id),
            Query(StoryViewParams {
                persona: Some(Persona::Her),
            }),
        )
        .await
        .unwrap();
        assert!(her_side.narrative.is_placeholder);
        assert_eq!(
            her_side.narrative.text,
            crate::content::placeholder(Persona::Her)
        );

        let body = serde_json::to_value(&her_side).unwrap();
        assert_eq!(body["narrative"]["text"], crate::content::placeholder(Persona::Her));
        assert_eq!(body["content"]["him"], "dele");
    }
}
