//! Guest Service - guest profile management and duplicate detection

use std::collections::HashMap;

use serde::Serialize;
use strsim::jaro_winkler;
use unicode_normalization::UnicodeNormalization;

use crate::domain::validation;
use crate::domain::{
    DomainError, Guest, GuestFields, GuestRepository, ReservationRepository, UpdateGuestInput,
};

/// Maximum number of guests returned by a search
pub const SEARCH_LIMIT: u64 = 10;

const NAME_SIMILARITY_THRESHOLD: f64 = 0.92;

/// Why a set of guests was flagged as a likely duplicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateReason {
    SameEmail,
    SimilarName,
}

/// A set of guests that probably describe the same person
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateGroup {
    pub reason: DuplicateReason,
    pub similarity: f64,
    pub guests: Vec<Guest>,
}

pub async fn list_guests(guests: &dyn GuestRepository) -> Result<Vec<Guest>, DomainError> {
    guests.find_all().await
}

pub async fn get_guest(guests: &dyn GuestRepository, id: &str) -> Result<Guest, DomainError> {
    guests.find_by_id(id).await?.ok_or(DomainError::NotFound)
}

/// Case-insensitive substring search over name and email
pub async fn search_guests(
    guests: &dyn GuestRepository,
    term: &str,
) -> Result<Vec<Guest>, DomainError> {
    let term = validation::required_text("q", term, validation::MAX_NAME_LEN)?;
    guests.search(&term, SEARCH_LIMIT).await
}

pub async fn create_guest(
    guests: &dyn GuestRepository,
    fields: GuestFields,
) -> Result<Guest, DomainError> {
    let fields = validation::guest_fields(fields)?;
    ensure_email_free(guests, &fields.email, None).await?;

    let guest = guests.create(fields).await?;
    tracing::info!("Created guest {}", guest.id);
    Ok(guest)
}

/// Apply a partial update. `Some(None)` clears an optional field.
pub async fn update_guest(
    guests: &dyn GuestRepository,
    id: &str,
    input: UpdateGuestInput,
) -> Result<Guest, DomainError> {
    let current = get_guest(guests, id).await?;

    let fields = validation::guest_fields(GuestFields {
        full_name: input.full_name.unwrap_or(current.full_name),
        email: input.email.unwrap_or(current.email),
        phone_number: input.phone_number.unwrap_or(current.phone_number),
        address: input.address.unwrap_or(current.address),
    })?;
    ensure_email_free(guests, &fields.email, Some(id)).await?;

    guests.update_fields(id, &fields).await
}

/// Delete a guest that holds no reservation. Stay history and its payments
/// are kept; a duplicate with history is folded away by merging instead.
pub async fn delete_guest(
    guests: &dyn GuestRepository,
    reservations: &dyn ReservationRepository,
    id: &str,
) -> Result<(), DomainError> {
    get_guest(guests, id).await?;

    if reservations.has_active_for_guest(id).await? {
        return Err(DomainError::Conflict(
            "Cannot delete guest with active reservations".to_string(),
        ));
    }
    if !reservations.find_ids_by_guest(id).await?.is_empty() {
        return Err(DomainError::Conflict(
            "Cannot delete guest with reservation history".to_string(),
        ));
    }

    guests.delete(id).await?;
    tracing::info!("Deleted guest {}", id);
    Ok(())
}

async fn ensure_email_free(
    guests: &dyn GuestRepository,
    email: &str,
    except_id: Option<&str>,
) -> Result<(), DomainError> {
    match guests.find_by_email(email).await? {
        Some(existing) if Some(existing.id.as_str()) != except_id => Err(DomainError::Conflict(
            "A guest with this email already exists".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Likely duplicates, offered to the front desk as merge candidates
pub async fn find_duplicates(
    guests: &dyn GuestRepository,
) -> Result<Vec<DuplicateGroup>, DomainError> {
    let all = guests.find_all().await?;
    Ok(detect_duplicates(&all))
}

/// Lowercase, strip accents and punctuation, collapse whitespace.
fn normalize_name(name: &str) -> String {
    let folded: String = name
        .nfd()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn detect_duplicates(guests: &[Guest]) -> Vec<DuplicateGroup> {
    let mut groups = Vec::new();

    let mut by_email: HashMap<String, Vec<Guest>> = HashMap::new();
    for guest in guests {
        by_email
            .entry(guest.email.trim().to_lowercase())
            .or_default()
            .push(guest.clone());
    }
    let mut email_groups: Vec<DuplicateGroup> = by_email
        .into_values()
        .filter(|group| group.len() > 1)
        .map(|guests| DuplicateGroup {
            reason: DuplicateReason::SameEmail,
            similarity: 1.0,
            guests,
        })
        .collect();
    email_groups.sort_by(|a, b| a.guests[0].email.cmp(&b.guests[0].email));
    groups.extend(email_groups);

    let names: Vec<String> = guests.iter().map(|g| normalize_name(&g.full_name)).collect();
    for i in 0..guests.len() {
        for j in (i + 1)..guests.len() {
            if names[i].is_empty() || guests[i].email.eq_ignore_ascii_case(&guests[j].email) {
                continue;
            }
            let score = jaro_winkler(&names[i], &names[j]);
            if score >= NAME_SIMILARITY_THRESHOLD {
                groups.push(DuplicateGroup {
                    reason: DuplicateReason::SimilarName,
                    similarity: score,
                    guests: vec![guests[i].clone(), guests[j].clone()],
                });
            }
        }
    }

    groups
}
