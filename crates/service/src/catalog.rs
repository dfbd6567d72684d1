//! Storefront catalog: public product views and staff product management.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::Utc;
use common::utils::text::{slugify, split_csv};
use models::{product, product_category, product_image, product_specification};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::ServiceError;

#[derive(Debug, Clone, Serialize)]
pub struct CategoryView {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

impl From<product_category::Model> for CategoryView {
    fn from(c: product_category::Model) -> Self {
        Self { id: c.id, name: c.name, slug: c.slug }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageView {
    pub id: Uuid,
    pub image_url: String,
    pub alt_text: String,
    pub is_primary: bool,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpecView {
    pub id: Uuid,
    pub name: String,
    pub value: String,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: Decimal,
    pub image_url: String,
    pub category: Option<CategoryView>,
    pub stock: i32,
    pub delivery_time_info: String,
    pub brand: String,
    pub model_number: String,
    pub weight: Option<Decimal>,
    pub dimensions: String,
    pub warranty_period: String,
    pub features: String,
    pub features_list: Vec<String>,
    pub meta_description: String,
    pub is_featured: bool,
    pub is_active: bool,
    pub additional_images: Vec<ImageView>,
    pub specifications: Vec<SpecView>,
    pub all_images: Vec<String>,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    pub updated_at: chrono::DateTime<chrono::FixedOffset>,
}

/// Detail page payload: the list view plus a spec map with storefront fallbacks.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: ProductView,
    pub specifications_dict: BTreeMap<String, String>,
}

/// Main image first, then additional images in sort order; repeats dropped.
pub fn all_images(main: &str, additional: &[ImageView]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    if !main.is_empty() && seen.insert(main.to_string()) {
        out.push(main.to_string());
    }
    for img in additional {
        if !img.image_url.is_empty() && seen.insert(img.image_url.clone()) {
            out.push(img.image_url.clone());
        }
    }
    out
}

pub fn default_features(warranty_period: &str) -> Vec<String> {
    vec![
        "High Quality Materials".to_string(),
        "Expert Installation Available".to_string(),
        format!("{warranty_period} Warranty"),
        "24/7 Customer Support".to_string(),
    ]
}

/// Stored specifications, or Brand/Model/Warranty/Stock when none exist.
pub fn specifications_dict(view: &ProductView) -> BTreeMap<String, String> {
    if !view.specifications.is_empty() {
        return view.specifications.iter().map(|s| (s.name.clone(), s.value.clone())).collect();
    }
    let brand = if view.brand.is_empty() { "TechVerse".to_string() } else { view.brand.clone() };
    let model = if view.model_number.is_empty() { view.name.clone() } else { view.model_number.clone() };
    BTreeMap::from([
        ("Brand".to_string(), brand),
        ("Model".to_string(), model),
        ("Warranty".to_string(), view.warranty_period.clone()),
        ("Stock".to_string(), format!("{} units", view.stock)),
    ])
}

async fn assemble<C: ConnectionTrait>(db: &C, products: Vec<product::Model>) -> Result<Vec<ProductView>, ServiceError> {
    if products.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
    let category_ids: Vec<Uuid> = products.iter().map(|p| p.category_id).collect();

    let categories: HashMap<Uuid, product_category::Model> = product_category::Entity::find()
        .filter(product_category::Column::Id.is_in(category_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    let mut images: HashMap<Uuid, Vec<ImageView>> = HashMap::new();
    for img in product_image::Entity::find()
        .filter(product_image::Column::ProductId.is_in(ids.clone()))
        .order_by_asc(product_image::Column::SortOrder)
        .order_by_asc(product_image::Column::CreatedAt)
        .all(db)
        .await?
    {
        images.entry(img.product_id).or_default().push(ImageView {
            id: img.id,
            image_url: img.image_url,
            alt_text: img.alt_text,
            is_primary: img.is_primary,
            sort_order: img.sort_order,
        });
    }

    let mut specs: HashMap<Uuid, Vec<SpecView>> = HashMap::new();
    for s in product_specification::Entity::find()
        .filter(product_specification::Column::ProductId.is_in(ids))
        .order_by_asc(product_specification::Column::SortOrder)
        .all(db)
        .await?
    {
        specs.entry(s.product_id).or_default().push(SpecView {
            id: s.id,
            name: s.name,
            value: s.value,
            sort_order: s.sort_order,
        });
    }

    Ok(products
        .into_iter()
        .map(|p| {
            let additional_images = images.remove(&p.id).unwrap_or_default();
            let specifications = specs.remove(&p.id).unwrap_or_default();
            let features_list = p.features_list();
            ProductView {
                all_images: all_images(&p.image_url, &additional_images),
                category: categories.get(&p.category_id).cloned().map(CategoryView::from),
                id: p.id,
                name: p.name,
                slug: p.slug,
                description: p.description,
                price: p.price,
                image_url: p.image_url,
                stock: p.stock,
                delivery_time_info: p.delivery_time_info,
                brand: p.brand,
                model_number: p.model_number,
                weight: p.weight,
                dimensions: p.dimensions,
                warranty_period: p.warranty_period,
                features: p.features,
                features_list,
                meta_description: p.meta_description,
                is_featured: p.is_featured,
                is_active: p.is_active,
                additional_images,
                specifications,
                created_at: p.created_at,
                updated_at: p.updated_at,
            }
        })
        .collect())
}

/// Active products for the storefront, newest first.
pub async fn list_products(db: &DatabaseConnection) -> Result<Vec<ProductView>, ServiceError> {
    let products = product::Entity::find()
        .filter(product::Column::IsActive.eq(true))
        .order_by_desc(product::Column::CreatedAt)
        .all(db)
        .await?;
    assemble(db, products).await
}

pub async fn product_detail(db: &DatabaseConnection, slug: &str) -> Result<ProductDetail, ServiceError> {
    let found = product::Entity::find()
        .filter(product::Column::Slug.eq(slug))
        .filter(product::Column::IsActive.eq(true))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Product"))?;
    let mut view = assemble(db, vec![found])
        .await?
        .pop()
        .ok_or_else(|| ServiceError::not_found("Product"))?;
    if view.features_list.is_empty() {
        view.features_list = default_features(&view.warranty_period);
    }
    let specifications_dict = specifications_dict(&view);
    Ok(ProductDetail { product: view, specifications_dict })
}

// ---- staff management ----

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    pub category_id: Option<Uuid>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpecInput {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub slug: Option<String>,
    pub category_id: Uuid,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub delivery_time_info: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model_number: String,
    pub weight: Option<Decimal>,
    #[serde(default)]
    pub dimensions: String,
    pub warranty_period: Option<String>,
    #[serde(default)]
    pub features: String,
    #[serde(default)]
    pub meta_description: String,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Replaces every stored specification when present.
    pub specifications: Option<Vec<SpecInput>>,
}

fn default_true() -> bool { true }

#[derive(Debug, Clone, Deserialize)]
pub struct ImageInput {
    pub image_url: String,
    #[serde(default)]
    pub alt_text: String,
    #[serde(default)]
    pub is_primary: bool,
    pub sort_order: Option<i32>,
}

pub async fn admin_list_products(
    db: &DatabaseConnection,
    filter: ProductFilter,
) -> Result<Vec<ProductView>, ServiceError> {
    let mut query = product::Entity::find().order_by_desc(product::Column::CreatedAt);
    if let Some(category_id) = filter.category_id {
        query = query.filter(product::Column::CategoryId.eq(category_id));
    }
    if let Some(active) = filter.is_active {
        query = query.filter(product::Column::IsActive.eq(active));
    }
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        query = query.filter(
            Condition::any()
                .add(product::Column::Name.like(pattern.clone()))
                .add(product::Column::Description.like(pattern.clone()))
                .add(product::Column::Brand.like(pattern)),
        );
    }
    let products = query.all(db).await?;
    assemble(db, products).await
}

pub async fn admin_get_product(db: &DatabaseConnection, id: Uuid) -> Result<ProductView, ServiceError> {
    let found = product::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Product"))?;
    assemble(db, vec![found]).await?.pop().ok_or_else(|| ServiceError::not_found("Product"))
}

fn validate_product_input(input: &ProductInput) -> Result<(), ServiceError> {
    if input.name.trim().is_empty() || input.description.trim().is_empty() {
        return Err(ServiceError::validation("Please fill in all required fields"));
    }
    product::validate_price(input.price)?;
    product::validate_stock(input.stock)?;
    product::validate_meta_description(&input.meta_description)?;
    Ok(())
}

/// Unique slug: explicit slugs must be free, derived ones get a numeric suffix.
async fn resolve_product_slug<C: ConnectionTrait>(
    db: &C,
    requested: Option<&str>,
    name: &str,
    current_id: Option<Uuid>,
) -> Result<String, ServiceError> {
    let taken = |slug: String| async move {
        let mut q = product::Entity::find().filter(product::Column::Slug.eq(slug));
        if let Some(id) = current_id {
            q = q.filter(product::Column::Id.ne(id));
        }
        Ok::<bool, ServiceError>(q.count(db).await? > 0)
    };
    if let Some(explicit) = requested.map(str::trim).filter(|s| !s.is_empty()) {
        let slug = slugify(explicit);
        if taken(slug.clone()).await? {
            return Err(ServiceError::Conflict(format!("Product with slug '{slug}' already exists")));
        }
        return Ok(slug);
    }
    let base = slugify(name);
    let base = if base.is_empty() { "product".to_string() } else { base };
    let mut slug = base.clone();
    let mut counter = 1;
    while taken(slug.clone()).await? {
        slug = format!("{base}-{counter}");
        counter += 1;
    }
    Ok(slug)
}

async fn ensure_category<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<(), ServiceError> {
    product_category::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::validation("Invalid category selected"))?;
    Ok(())
}

async fn replace_specifications<C: ConnectionTrait>(
    db: &C,
    product_id: Uuid,
    specs: Vec<SpecInput>,
) -> Result<(), ServiceError> {
    product_specification::Entity::delete_many()
        .filter(product_specification::Column::ProductId.eq(product_id))
        .exec(db)
        .await?;
    let mut seen = HashSet::new();
    let kept = specs
        .into_iter()
        .filter(|s| !s.name.trim().is_empty() && !s.value.trim().is_empty())
        .filter(|s| seen.insert(s.name.trim().to_string()));
    for (order, spec) in kept.enumerate() {
        product_specification::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            name: Set(spec.name.trim().to_string()),
            value: Set(spec.value.trim().to_string()),
            sort_order: Set(order as i32),
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

pub async fn create_product(db: &DatabaseConnection, input: ProductInput) -> Result<ProductView, ServiceError> {
    validate_product_input(&input)?;
    let txn = db.begin().await?;
    ensure_category(&txn, input.category_id).await?;
    let slug = resolve_product_slug(&txn, input.slug.as_deref(), &input.name, None).await?;
    let now = Utc::now();
    let created = product::ActiveModel {
        id: Set(Uuid::new_v4()),
        category_id: Set(input.category_id),
        name: Set(input.name.trim().to_string()),
        slug: Set(slug),
        description: Set(input.description),
        price: Set(input.price),
        image_url: Set(input.image_url),
        stock: Set(input.stock),
        delivery_time_info: Set(input.delivery_time_info),
        brand: Set(input.brand),
        model_number: Set(input.model_number),
        weight: Set(input.weight),
        dimensions: Set(input.dimensions),
        warranty_period: Set(input.warranty_period.unwrap_or_else(|| "1 Year".to_string())),
        features: Set(split_csv(&input.features).join(", ")),
        meta_description: Set(input.meta_description),
        is_featured: Set(input.is_featured),
        is_active: Set(input.is_active),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;
    if let Some(specs) = input.specifications {
        replace_specifications(&txn, created.id, specs).await?;
    }
    txn.commit().await?;
    info!(product_id = %created.id, slug = %created.slug, "product_created");
    admin_get_product(db, created.id).await
}

pub async fn update_product(
    db: &DatabaseConnection,
    id: Uuid,
    input: ProductInput,
) -> Result<ProductView, ServiceError> {
    validate_product_input(&input)?;
    let txn = db.begin().await?;
    let existing = product::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Product"))?;
    ensure_category(&txn, input.category_id).await?;
    let slug = match input.slug.as_deref() {
        Some(s) if !s.trim().is_empty() && slugify(s) != existing.slug => {
            resolve_product_slug(&txn, Some(s), &input.name, Some(id)).await?
        }
        _ => existing.slug.clone(),
    };
    let mut am: product::ActiveModel = existing.into();
    am.category_id = Set(input.category_id);
    am.name = Set(input.name.trim().to_string());
    am.slug = Set(slug);
    am.description = Set(input.description);
    am.price = Set(input.price);
    if !input.image_url.is_empty() {
        am.image_url = Set(input.image_url);
    }
    am.stock = Set(input.stock);
    am.delivery_time_info = Set(input.delivery_time_info);
    am.brand = Set(input.brand);
    am.model_number = Set(input.model_number);
    am.weight = Set(input.weight);
    am.dimensions = Set(input.dimensions);
    am.warranty_period = Set(input.warranty_period.unwrap_or_else(|| "1 Year".to_string()));
    am.features = Set(split_csv(&input.features).join(", "));
    am.meta_description = Set(input.meta_description);
    am.is_featured = Set(input.is_featured);
    am.is_active = Set(input.is_active);
    am.updated_at = Set(Utc::now().into());
    am.update(&txn).await?;
    if let Some(specs) = input.specifications {
        replace_specifications(&txn, id, specs).await?;
    }
    txn.commit().await?;
    info!(product_id = %id, "product_updated");
    admin_get_product(db, id).await
}

pub async fn delete_product(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let res = product::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("Product"));
    }
    info!(product_id = %id, "product_deleted");
    Ok(())
}

/// A new primary image demotes any existing primary of the same product.
pub async fn add_product_image(
    db: &DatabaseConnection,
    product_id: Uuid,
    input: ImageInput,
) -> Result<product_image::Model, ServiceError> {
    if input.image_url.trim().is_empty() {
        return Err(ServiceError::validation("image_url is required"));
    }
    let txn = db.begin().await?;
    let p = product::Entity::find_by_id(product_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Product"))?;
    let existing = product_image::Entity::find()
        .filter(product_image::Column::ProductId.eq(product_id))
        .count(&txn)
        .await?;
    if input.is_primary {
        product_image::Entity::update_many()
            .col_expr(product_image::Column::IsPrimary, sea_orm::sea_query::Expr::value(false))
            .filter(product_image::Column::ProductId.eq(product_id))
            .exec(&txn)
            .await?;
    }
    let alt_text = if input.alt_text.trim().is_empty() {
        format!("{} - Image {}", p.name, existing + 1)
    } else {
        input.alt_text
    };
    let created = product_image::ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(product_id),
        image_url: Set(input.image_url.trim().to_string()),
        alt_text: Set(alt_text),
        is_primary: Set(input.is_primary),
        sort_order: Set(input.sort_order.unwrap_or(existing as i32)),
        created_at: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;
    Ok(created)
}

pub async fn delete_product_image(db: &DatabaseConnection, image_id: Uuid) -> Result<(), ServiceError> {
    let res = product_image::Entity::delete_by_id(image_id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("Image"));
    }
    Ok(())
}

/// Insert or overwrite one specification keyed by name.
pub async fn upsert_specification(
    db: &DatabaseConnection,
    product_id: Uuid,
    input: SpecInput,
) -> Result<product_specification::Model, ServiceError> {
    let name = input.name.trim().to_string();
    let value = input.value.trim().to_string();
    if name.is_empty() || value.is_empty() {
        return Err(ServiceError::validation("Specification name and value are required"));
    }
    product::Entity::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Product"))?;
    let existing = product_specification::Entity::find()
        .filter(product_specification::Column::ProductId.eq(product_id))
        .filter(product_specification::Column::Name.eq(name.clone()))
        .one(db)
        .await?;
    match existing {
        Some(spec) => {
            let mut am: product_specification::ActiveModel = spec.into();
            am.value = Set(value);
            Ok(am.update(db).await?)
        }
        None => {
            let order = product_specification::Entity::find()
                .filter(product_specification::Column::ProductId.eq(product_id))
                .count(db)
                .await?;
            Ok(product_specification::ActiveModel {
                id: Set(Uuid::new_v4()),
                product_id: Set(product_id),
                name: Set(name),
                value: Set(value),
                sort_order: Set(order as i32),
            }
            .insert(db)
            .await?)
        }
    }
}

// ---- product categories ----

pub async fn list_categories(db: &DatabaseConnection) -> Result<Vec<CategoryView>, ServiceError> {
    Ok(product_category::Entity::find()
        .order_by_asc(product_category::Column::Name)
        .all(db)
        .await?
        .into_iter()
        .map(CategoryView::from)
        .collect())
}

pub async fn create_category(
    db: &DatabaseConnection,
    name: &str,
    slug: Option<&str>,
) -> Result<CategoryView, ServiceError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::validation("Category name is required"));
    }
    if product_category::Entity::find()
        .filter(product_category::Column::Name.eq(name))
        .count(db)
        .await?
        > 0
    {
        return Err(ServiceError::Conflict(format!("Category \"{name}\" already exists")));
    }
    let base = match slug.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => slugify(s),
        None => slugify(name),
    };
    let mut candidate = base.clone();
    let mut counter = 1;
    while product_category::Entity::find()
        .filter(product_category::Column::Slug.eq(candidate.clone()))
        .count(db)
        .await?
        > 0
    {
        candidate = format!("{base}-{counter}");
        counter += 1;
    }
    let created = product_category::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        slug: Set(candidate),
    }
    .insert(db)
    .await?;
    info!(category_id = %created.id, "product_category_created");
    Ok(created.into())
}

pub async fn update_category(
    db: &DatabaseConnection,
    id: Uuid,
    name: &str,
    slug: Option<&str>,
) -> Result<CategoryView, ServiceError> {
    if name.trim().is_empty() {
        return Err(ServiceError::validation("Category name is required"));
    }
    let mut am: product_category::ActiveModel = product_category::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Category"))?
        .into();
    am.name = Set(name.trim().to_string());
    if let Some(s) = slug.map(str::trim).filter(|s| !s.is_empty()) {
        am.slug = Set(slugify(s));
    }
    Ok(am.update(db).await?.into())
}

/// Categories that still own products are kept.
pub async fn delete_category(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let category = product_category::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Category"))?;
    let product_count = product::Entity::find()
        .filter(product::Column::CategoryId.eq(id))
        .count(db)
        .await?;
    if product_count > 0 {
        return Err(ServiceError::invalid_state(format!(
            "Cannot delete category \"{}\" because it has {} associated products. Please reassign or delete those products first.",
            category.name, product_count
        )));
    }
    product_category::Entity::delete_by_id(id).exec(db).await?;
    info!(category_id = %id, "product_category_deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, make_product, skip_db};
    use rust_decimal_macros::dec;

    fn image(url: &str) -> ImageView {
        ImageView { id: Uuid::new_v4(), image_url: url.into(), alt_text: String::new(), is_primary: false, sort_order: 0 }
    }

    #[test]
    fn all_images_puts_main_first_without_repeats() {
        let extra = vec![image("b.png"), image("a.png"), image("c.png"), image("b.png")];
        assert_eq!(all_images("a.png", &extra), vec!["a.png", "b.png", "c.png"]);
        assert_eq!(all_images("", &extra), vec!["b.png", "a.png", "c.png"]);
    }

    #[test]
    fn default_features_mention_warranty() {
        let f = default_features("2 Years");
        assert_eq!(f.len(), 4);
        assert_eq!(f[2], "2 Years Warranty");
    }

    #[tokio::test]
    async fn detail_falls_back_to_default_specs() -> Result<(), anyhow::Error> {
        if skip_db() { return Ok(()); }
        let db = get_db().await?;
        let p = make_product(&db, dec!(32999.00), 7).await?;

        let detail = product_detail(&db, &p.slug).await?;
        assert_eq!(detail.specifications_dict.get("Brand").map(String::as_str), Some("TechVerse"));
        assert_eq!(detail.specifications_dict.get("Model").map(String::as_str), Some("Inverter AC"));
        assert_eq!(detail.specifications_dict.get("Stock").map(String::as_str), Some("7 units"));
        assert_eq!(detail.product.features_list[0], "High Quality Materials");

        upsert_specification(&db, p.id, SpecInput { name: "Capacity".into(), value: "1.5 Ton".into() }).await?;
        upsert_specification(&db, p.id, SpecInput { name: "Capacity".into(), value: "2 Ton".into() }).await?;
        let detail = product_detail(&db, &p.slug).await?;
        assert_eq!(detail.specifications_dict.len(), 1);
        assert_eq!(detail.specifications_dict["Capacity"], "2 Ton");
        Ok(())
    }

    #[tokio::test]
    async fn single_primary_image() -> Result<(), anyhow::Error> {
        if skip_db() { return Ok(()); }
        let db = get_db().await?;
        let p = make_product(&db, dec!(999.00), 1).await?;
        let input = |url: &str| ImageInput { image_url: url.into(), alt_text: String::new(), is_primary: true, sort_order: None };
        add_product_image(&db, p.id, input("https://cdn.example.com/1.png")).await?;
        let second = add_product_image(&db, p.id, input("https://cdn.example.com/2.png")).await?;

        let view = admin_get_product(&db, p.id).await?;
        let primaries: Vec<_> = view.additional_images.iter().filter(|i| i.is_primary).collect();
        assert_eq!(primaries.len(), 1);
        assert_eq!(primaries[0].id, second.id);
        Ok(())
    }

    #[tokio::test]
    async fn category_with_products_cannot_be_deleted() -> Result<(), anyhow::Error> {
        if skip_db() { return Ok(()); }
        let db = get_db().await?;
        let p = make_product(&db, dec!(10.00), 1).await?;
        let err = delete_category(&db, p.category_id).await.unwrap_err();
        assert!(err.to_string().contains("because it has 1 associated products"));

        let empty = create_category(&db, &format!("Spare Parts {}", Uuid::new_v4().simple()), None).await?;
        assert!(empty.slug.starts_with("spare-parts-"));
        delete_category(&db, empty.id).await?;
        Ok(())
    }

    #[tokio::test]
    async fn derived_slugs_get_suffixes() -> Result<(), anyhow::Error> {
        if skip_db() { return Ok(()); }
        let db = get_db().await?;
        let cat = create_category(&db, &format!("Fans {}", Uuid::new_v4().simple()), None).await?;
        let name = format!("Ceiling Fan {}", Uuid::new_v4().simple());
        let input = ProductInput {
            name: name.clone(),
            slug: None,
            category_id: cat.id,
            description: "Quiet BLDC fan".into(),
            price: dec!(2499.00),
            stock: 3,
            image_url: String::new(),
            delivery_time_info: String::new(),
            brand: String::new(),
            model_number: String::new(),
            weight: None,
            dimensions: String::new(),
            warranty_period: None,
            features: " Remote , ,BLDC ".into(),
            meta_description: String::new(),
            is_featured: false,
            is_active: true,
            specifications: Some(vec![SpecInput { name: "Sweep".into(), value: "1200mm".into() }]),
        };
        let first = create_product(&db, input.clone()).await?;
        let second = create_product(&db, input).await?;
        assert_eq!(second.slug, format!("{}-1", first.slug));
        assert_eq!(first.features_list, vec!["Remote", "BLDC"]);
        assert_eq!(first.warranty_period, "1 Year");
        assert_eq!(first.specifications.len(), 1);
        Ok(())
    }
}
