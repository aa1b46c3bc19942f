//! Setup Service - first-run owner creation, hotel settings and login

use sea_orm::*;
use serde::Serialize;

use crate::domain::DomainError;
use crate::domain::validation;
use crate::infrastructure::auth::{create_jwt, hash_password, verify_password};
use crate::models::hotel_settings::{self, Entity as HotelSettings};
use crate::models::user::{self, Entity as User};

const SETTINGS_ID: i32 = 1;
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone)]
pub struct SetupInput {
    pub owner_email: String,
    pub owner_full_name: String,
    pub password: String,
    pub hotel_name: String,
    pub timezone: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SetupStatus {
    pub owner_exists: bool,
    pub hotel_configured: bool,
    pub hotel: Option<hotel_settings::Model>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SetupResult {
    pub owner: user::Model,
    pub hotel: hotel_settings::Model,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginToken {
    pub token: String,
    pub owner: user::Model,
}

pub async fn setup_status(db: &DatabaseConnection) -> Result<SetupStatus, DomainError> {
    let owner_exists = User::find().count(db).await? > 0;
    let hotel = HotelSettings::find_by_id(SETTINGS_ID).one(db).await?;

    Ok(SetupStatus {
        owner_exists,
        hotel_configured: hotel.is_some(),
        hotel,
    })
}

/// Create the single owner and the hotel settings. Refused once an owner exists.
pub async fn run_setup(
    db: &DatabaseConnection,
    input: SetupInput,
) -> Result<SetupResult, DomainError> {
    let email = validation::email(&input.owner_email)?;
    let full_name = validation::person_name(&input.owner_full_name)?;
    let hotel_name = validation::required_text("hotel_name", &input.hotel_name, 100)?;
    let timezone = validation::timezone(&input.timezone)?;
    if input.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::Validation(format!(
            "password: must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    if User::find().count(db).await? > 0 {
        return Err(DomainError::Conflict("Owner already exists".to_string()));
    }

    let password_hash = hash_password(&input.password).map_err(DomainError::Internal)?;
    let now = chrono::Utc::now().to_rfc3339();

    let owner = user::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        email: Set(email),
        full_name: Set(full_name),
        password_hash: Set(password_hash),
        created_at: Set(now.clone()),
    }
    .insert(db)
    .await?;
    tracing::info!("Owner account created for {}", owner.email);

    let hotel = match HotelSettings::find_by_id(SETTINGS_ID).one(db).await? {
        Some(existing) => {
            let mut settings: hotel_settings::ActiveModel = existing.into();
            settings.name = Set(hotel_name);
            settings.timezone = Set(timezone);
            settings.updated_at = Set(now);
            settings.update(db).await?
        }
        None => {
            hotel_settings::ActiveModel {
                id: Set(SETTINGS_ID),
                name: Set(hotel_name),
                timezone: Set(timezone),
                created_at: Set(now.clone()),
                updated_at: Set(now),
            }
            .insert(db)
            .await?
        }
    };

    Ok(SetupResult { owner, hotel })
}

/// `Ok(None)` means the credentials did not match.
pub async fn login(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> Result<Option<LoginToken>, DomainError> {
    tracing::info!("Login attempt for {}", email);

    let owner = match User::find()
        .filter(user::Column::Email.eq(email.trim()))
        .one(db)
        .await?
    {
        Some(owner) => owner,
        None => {
            tracing::warn!("No owner account for {}", email);
            return Ok(None);
        }
    };

    match verify_password(password, &owner.password_hash) {
        Ok(true) => {
            let token = create_jwt(&owner.id, &owner.email).map_err(DomainError::Internal)?;
            Ok(Some(LoginToken { token, owner }))
        }
        Ok(false) => {
            tracing::warn!("Password verification failed for {}", email);
            Ok(None)
        }
        Err(e) => {
            tracing::error!("Stored password hash for {} is unreadable: {}", email, e);
            Ok(None)
        }
    }
}
