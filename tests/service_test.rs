use anyhow::Result;
use attractions_catalog::domain::PageRequest;
use chrono::{Duration, Utc};
use attractions_catalog::dto::{AssistanceDto, AttractionDto, LocalityDto};
use attractions_catalog::error::CatalogError;
use attractions_catalog::services::{AssistanceService, AttractionService, LocalityService};
use attractions_catalog::storage::{InMemoryStorage, Storage};
use std::sync::Arc;
use uuid::Uuid;

fn services() -> (LocalityService, AssistanceService, AttractionService) {
    let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
    (
        LocalityService::new(storage.clone()),
        AssistanceService::new(storage.clone()),
        AttractionService::new(storage),
    )
}

fn locality_dto(name: &str) -> LocalityDto {
    LocalityDto {
        name: Some(name.to_string()),
        region: Some("North".to_string()),
        latitude: Some(59.93),
        longitude: Some(30.31),
        ..Default::default()
    }
}

fn attraction_dto(name: &str, attraction_type: &str, locality_id: Uuid) -> AttractionDto {
    AttractionDto {
        name: Some(name.to_string()),
        attraction_type: Some(attraction_type.to_string()),
        locality_id: Some(locality_id),
        ..Default::default()
    }
}

fn page(page: usize, size: usize) -> PageRequest {
    PageRequest::new(Some(page), Some(size), None, "name")
}

#[tokio::test]
async fn created_identifiers_are_stable_across_reads() -> Result<()> {
    let (localities, _, _) = services();

    let created = localities.add(locality_dto("Pavlovsk")).await?;
    let id = created.id.expect("id assigned on create");

    let first = localities.get(id).await?;
    let second = localities.get(id).await?;
    assert_eq!(first.id, Some(id));
    assert_eq!(second.id, Some(id));
    assert_eq!(first.name.as_deref(), Some("Pavlovsk"));
    Ok(())
}

#[tokio::test]
async fn attraction_with_unknown_locality_fails_without_write() -> Result<()> {
    let (_, _, attractions) = services();

    let err = attractions
        .add(attraction_dto("Hermitage", "MUSEUM", Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(_)));

    let listed = attractions.list(None, page(0, 10)).await?;
    assert_eq!(listed.total_elements, 0);
    Ok(())
}

#[tokio::test]
async fn attraction_with_invalid_type_fails_without_write() -> Result<()> {
    let (localities, _, attractions) = services();

    let locality = localities.add(locality_dto("Pushkin")).await?;
    let err = attractions
        .add(attraction_dto("Catherine Palace", "CASTLE", locality.id.unwrap()))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::InvalidArgument(_)));

    let listed = attractions.list(None, page(0, 10)).await?;
    assert_eq!(listed.total_elements, 0);
    Ok(())
}

#[tokio::test]
async fn updating_missing_ids_fails_with_not_found() -> Result<()> {
    let (localities, assistances, attractions) = services();
    let missing = Uuid::new_v4();

    let err = localities
        .update(missing, locality_dto("Nowhere"))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(_)));

    let err = assistances
        .update(
            missing,
            AssistanceDto {
                assistance_type: Some("GUIDE".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(_)));

    let err = attractions
        .update(missing, attraction_dto("Nowhere", "PARK", missing))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn delete_removes_the_row_and_missing_ids_fail() -> Result<()> {
    let (_, assistances, _) = services();

    let err = assistances.delete(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(_)));

    let created = assistances
        .add(AssistanceDto {
            assistance_type: Some("GUIDE".to_string()),
            ..Default::default()
        })
        .await?;
    let id = created.id.unwrap();

    assistances.delete(id).await?;
    let err = assistances.get(id).await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn type_filter_matches_case_insensitively() -> Result<()> {
    let (localities, _, attractions) = services();
    let locality_id = localities.add(locality_dto("Gatchina")).await?.id.unwrap();

    attractions
        .add(attraction_dto("Gatchina Palace", "PALACE", locality_id))
        .await?;
    attractions
        .add(attraction_dto("Palace Museum", "MUSEUM", locality_id))
        .await?;

    let museums = attractions
        .list(Some("museum".to_string()), page(0, 10))
        .await?;
    assert_eq!(museums.total_elements, 1);
    assert_eq!(
        museums.content[0].attraction_type.as_deref(),
        Some("MUSEUM")
    );

    let err = attractions
        .list(Some("pyramid".to_string()), page(0, 10))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::InvalidArgument(_)));
    Ok(())
}

#[tokio::test]
async fn list_by_locality_paginates_in_name_order() -> Result<()> {
    let (localities, _, attractions) = services();
    let target = localities.add(locality_dto("Vyborg")).await?.id.unwrap();
    let other = localities.add(locality_dto("Priozersk")).await?.id.unwrap();

    for i in 1..=12 {
        attractions
            .add(attraction_dto(&format!("Site {i:02}"), "PARK", target))
            .await?;
    }
    attractions
        .add(attraction_dto("Elsewhere", "PARK", other))
        .await?;

    let first = attractions.list_by_locality(target, page(0, 10)).await?;
    assert_eq!(first.content.len(), 10);
    assert_eq!(first.total_elements, 12);
    assert_eq!(first.total_pages, 2);
    assert_eq!(first.content[0].name.as_deref(), Some("Site 01"));

    let second = attractions.list_by_locality(target, page(1, 10)).await?;
    assert_eq!(second.content.len(), 2);
    assert_eq!(second.content[1].name.as_deref(), Some("Site 12"));

    // Unknown locality yields an empty page, not an error
    let empty = attractions
        .list_by_locality(Uuid::new_v4(), page(0, 10))
        .await?;
    assert_eq!(empty.total_elements, 0);
    Ok(())
}

#[tokio::test]
async fn assistance_round_trip_preserves_fields() -> Result<()> {
    let (_, assistances, _) = services();

    let created = assistances
        .add(AssistanceDto {
            assistance_type: Some("GUIDE".to_string()),
            short_description: Some("X".to_string()),
            executor: Some("Y".to_string()),
            ..Default::default()
        })
        .await?;
    let id = created.id.expect("id assigned on create");

    let fetched = assistances.get(id).await?;
    assert_eq!(fetched.assistance_type.as_deref(), Some("GUIDE"));
    assert_eq!(fetched.short_description.as_deref(), Some("X"));
    assert_eq!(fetched.executor.as_deref(), Some("Y"));
    Ok(())
}

#[tokio::test]
async fn unresolved_assistance_ids_fail_fast() -> Result<()> {
    let (localities, _, _) = services();

    let mut dto = locality_dto("Kronstadt");
    dto.assistance_ids = Some(vec![Uuid::new_v4()]);

    let err = localities.add(dto).await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(_)));

    let listed = localities.list(page(0, 10)).await?;
    assert_eq!(listed.total_elements, 0);
    Ok(())
}

#[tokio::test]
async fn deleting_a_locality_cascades_to_its_attractions() -> Result<()> {
    let (localities, _, attractions) = services();
    let locality_id = localities.add(locality_dto("Oranienbaum")).await?.id.unwrap();

    attractions
        .add(attraction_dto("Chinese Palace", "PALACE", locality_id))
        .await?;

    localities.delete(locality_id).await?;

    let listed = attractions.list(None, page(0, 10)).await?;
    assert_eq!(listed.total_elements, 0);
    Ok(())
}

#[tokio::test]
async fn deleting_an_assistance_detaches_it_from_attractions() -> Result<()> {
    let (localities, assistances, attractions) = services();
    let locality_id = localities.add(locality_dto("Peterhof")).await?.id.unwrap();

    let assistance_id = assistances
        .add(AssistanceDto {
            assistance_type: Some("GUIDE".to_string()),
            ..Default::default()
        })
        .await?
        .id
        .unwrap();

    let mut dto = attraction_dto("Grand Palace", "PALACE", locality_id);
    dto.assistance_ids = Some(vec![assistance_id]);
    attractions.add(dto).await?;

    assistances.delete(assistance_id).await?;

    let listed = attractions.list(None, page(0, 10)).await?;
    assert_eq!(listed.content[0].assistance_ids, Some(Vec::new()));
    Ok(())
}

#[tokio::test]
async fn locality_update_replaces_description_and_associations_only() -> Result<()> {
    let (localities, assistances, _) = services();
    let created = localities.add(locality_dto("Shlisselburg")).await?;
    let id = created.id.unwrap();

    let assistance_id = assistances
        .add(AssistanceDto {
            assistance_type: Some("TRANSPORT".to_string()),
            ..Default::default()
        })
        .await?
        .id
        .unwrap();

    let updated = localities
        .update(
            id,
            LocalityDto {
                short_description: Some("Fortress town".to_string()),
                assistance_ids: Some(vec![assistance_id]),
                ..Default::default()
            },
        )
        .await?;

    // Name survives; description and association set are replaced
    assert_eq!(updated.name.as_deref(), Some("Shlisselburg"));
    assert_eq!(updated.short_description.as_deref(), Some("Fortress town"));
    assert_eq!(updated.assistance_ids, Some(vec![assistance_id]));
    Ok(())
}

#[tokio::test]
async fn attraction_update_revalidates_locality_and_type() -> Result<()> {
    let (localities, _, attractions) = services();
    let locality_id = localities.add(locality_dto("Staraya Ladoga")).await?.id.unwrap();

    let created = attractions
        .add(attraction_dto("Fortress", "RESERVE", locality_id))
        .await?;
    let id = created.id.unwrap();
    let creation_date = created.creation_date;

    let err = attractions
        .update(id, attraction_dto("Fortress", "RESERVE", Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(_)));

    let mut dto = attraction_dto("Fortress Museum", "MUSEUM", locality_id);
    // A caller-supplied creation date must be ignored on update
    dto.creation_date = Some(Utc::now() - Duration::days(30));
    let updated = attractions.update(id, dto).await?;
    assert_eq!(updated.attraction_type.as_deref(), Some("MUSEUM"));
    assert_eq!(updated.name.as_deref(), Some("Fortress Museum"));
    assert_eq!(updated.creation_date, creation_date);
    Ok(())
}

#[tokio::test]
async fn duplicate_assistance_ids_collapse_to_one_association() -> Result<()> {
    let (localities, assistances, attractions) = services();
    let locality_id = localities.add(locality_dto("Ivangorod")).await?.id.unwrap();

    let assistance_id = assistances
        .add(AssistanceDto {
            assistance_type: Some("GUIDE".to_string()),
            ..Default::default()
        })
        .await?
        .id
        .unwrap();

    let mut dto = attraction_dto("Ivangorod Fortress", "RESERVE", locality_id);
    dto.assistance_ids = Some(vec![assistance_id, assistance_id]);
    let created = attractions.add(dto).await?;
    assert_eq!(created.assistance_ids, Some(vec![assistance_id]));

    let mut dto = locality_dto("Narva Riverside");
    dto.assistance_ids = Some(vec![assistance_id, assistance_id]);
    let updated = localities
        .update(localities.add(dto.clone()).await?.id.unwrap(), dto)
        .await?;
    assert_eq!(updated.assistance_ids, Some(vec![assistance_id]));
    Ok(())
}
