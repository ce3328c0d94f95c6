use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{models::Category, repositories::CategoryRepository};

struct Seed {
    name: &'static str,
    description: &'static str,
    children: &'static [Seed],
}

const fn leaf(name: &'static str, description: &'static str) -> Seed {
    Seed {
        name,
        description,
        children: &[],
    }
}

const fn node(name: &'static str, description: &'static str, children: &'static [Seed]) -> Seed {
    Seed {
        name,
        description,
        children,
    }
}

/// Catch-all child added under every second-level category.
const OTHER: Seed = leaf("Other", "Miscellaneous / Other items");

const DEFAULT_TREE: &[Seed] = &[
    node(
        "Electronic Devices",
        "Smartphones, laptops, tablets, and other electronic devices",
        &[
            leaf("Feature Phones", "Basic mobile phones"),
            leaf("Really Like New", "Refurbished and certified pre-owned devices"),
            leaf("Security Cameras", "CCTV and security camera systems"),
            leaf("Gaming Consoles", "PlayStation, Xbox, and gaming systems"),
            node(
                "Smart Phones",
                "Android and iOS smartphones",
                &[
                    leaf("Nokia Mobiles", "Nokia feature phones and smartphones"),
                    leaf("Honor Mobiles", "Honor smartphones"),
                    leaf("Infinix Mobiles", "Infinix smartphones"),
                    leaf("Realme Mobiles", "Realme smartphones"),
                    leaf("Redmi Mobiles", "Xiaomi Redmi smartphones"),
                    leaf("Oneplus Mobiles", "OnePlus smartphones"),
                    leaf("Oppo Mobile Phones", "Oppo smartphones"),
                    leaf("Apple iPhones", "iPhone smartphones"),
                    leaf("Tecno Mobiles", "Tecno smartphones"),
                    leaf("Samsung Mobile Phones", "Samsung Galaxy smartphones"),
                    leaf("Vivo Mobiles", "Vivo smartphones"),
                ],
            ),
            leaf("Cameras & Drones", "Digital cameras, action cams, and drones"),
            leaf("Smart Watches", "Smartwatches and fitness trackers"),
            leaf("Monitors", "Computer monitors and displays"),
            leaf("Landline Phones", "Home phones and cordless phones"),
            node(
                "Laptops",
                "Laptops and notebooks",
                &[
                    leaf("HP", "HP laptops and notebooks"),
                    leaf("Dell", "Dell laptops and notebooks"),
                    leaf("Lenovo", "Lenovo laptops and ThinkPad"),
                    leaf("Asus", "Asus laptops and gaming laptops"),
                    leaf("Acer", "Acer laptops and notebooks"),
                    leaf("Apple MacBook", "MacBook Air and MacBook Pro"),
                    leaf("MSI", "MSI gaming laptops"),
                ],
            ),
            leaf("Desktops", "Desktop computers and all-in-ones"),
        ],
    ),
    node(
        "Electronic Accessories",
        "Chargers, cables, cases, and other electronic accessories",
        &[
            leaf("Chargers & Cables", "Phone and laptop chargers, USB cables"),
            leaf("Cases & Covers", "Phone cases, laptop sleeves, screen protectors"),
            leaf("Power Banks", "Portable chargers and power banks"),
            leaf("Memory Cards", "SD cards, USB drives, external storage"),
            node(
                "Computer & Laptop Accessories",
                "Accessories for computers and laptops such as bags, cooling pads, chargers and docks",
                &[
                    leaf("Laptop Bags & Sleeves", "Backpacks, sleeves and protective bags for laptops"),
                    leaf("Laptop Chargers", "Chargers and power adapters for laptops"),
                    leaf("Cooling Pads", "Laptop cooling pads and external fans"),
                    leaf("Docking Stations & Hubs", "Docks, USB-C hubs and docking stations"),
                    leaf("Keyboards & Mice", "External keyboards, mice and combos"),
                    leaf("Laptop Stands & Risers", "Adjustable laptop stands and risers"),
                    leaf("Internal SSDs & HDDs", "Internal storage: SSDs and HDDs"),
                    leaf("External Storage", "External HDDs, SSDs and enclosures"),
                ],
            ),
            node(
                "Mobile Phone Accessories",
                "Phone cases, screen protectors, chargers, earphones, mounts and cables",
                &[
                    leaf("Phone Cases", "Protective phone cases and covers"),
                    leaf("Screen Protectors", "Tempered glass and film protectors"),
                    leaf("Phone Chargers & Cables", "Wall chargers, car chargers and charging cables"),
                    leaf("Earphones & Headphones", "Wired and wireless earphones and headphones"),
                    leaf("Power Banks", "Portable chargers and power banks"),
                    leaf("Car Mounts & Holders", "Phone holders, magnetic mounts and tripods"),
                    leaf("Selfie Sticks & Mini Tripods", "Selfie sticks and small tripods for phones"),
                ],
            ),
            node(
                "Camera Accessories",
                "Camera bags, tripods, batteries, lenses, filters and lighting",
                &[
                    leaf("Camera Bags & Cases", "Camera bags, shoulder bags and protective cases"),
                    leaf("Tripods & Monopods", "Tripods, monopods and flexible tripods"),
                    leaf("Camera Batteries & Chargers", "Spare batteries and chargers"),
                    leaf("Camera Lenses & Mounts", "Prime and zoom lenses, lens mounts and adapters"),
                    leaf("Memory Cards (Camera)", "SD cards, microSD and CF for cameras"),
                    leaf("Flashes & Lighting", "External flashes, studio lighting and LED panels"),
                    leaf("Filters & Lens Accessories", "Filters, hoods and lens caps"),
                    leaf("Gimbals & Stabilizers", "Gimbals and stabilizers for video shooting"),
                ],
            ),
        ],
    ),
    node(
        "Home Appliances",
        "Air conditioners, washing machines, refrigerators, and other home appliances",
        &[
            leaf("Air Conditioners", "Split and window AC units"),
            leaf("Washing Machines", "Front load and top load washing machines"),
            leaf("Refrigerators", "Single and double door refrigerators"),
            leaf("Kitchen Appliances", "Microwaves, blenders, toasters"),
        ],
    ),
    node(
        "Health & Beauty",
        "Skincare, makeup, fragrances, and personal care products",
        &[
            leaf("Skincare", "Face wash, moisturizers, serums"),
            leaf("Makeup", "Lipstick, foundation, eyeshadow"),
            leaf("Fragrances", "Perfumes and body sprays"),
            leaf("Personal Care", "Hair care, bath & body products"),
        ],
    ),
    node(
        "Mother & Baby",
        "Baby care, feeding, diapers, and maternity products",
        &[
            leaf("Baby Care", "Baby shampoo, lotion, wipes"),
            leaf("Feeding", "Bottles, formula, baby food"),
            leaf("Diapers", "Disposable and cloth diapers"),
            leaf("Maternity", "Maternity clothing and accessories"),
        ],
    ),
    node(
        "Groceries & Pets",
        "Food, beverages, pet supplies, and household essentials",
        &[
            leaf("Food & Beverages", "Snacks, drinks, packaged foods"),
            leaf("Pet Supplies", "Pet food, toys, accessories"),
            leaf("Household Essentials", "Cleaning supplies, laundry detergent"),
        ],
    ),
    node(
        "Home & Lifestyle",
        "Furniture, home decor, kitchen, bedding, and bath products",
        &[
            leaf("Furniture", "Sofas, tables, chairs, storage"),
            leaf("Home Decor", "Wall art, lighting, decorative items"),
            leaf("Kitchen & Dining", "Cookware, dinnerware, utensils"),
            leaf("Bedding & Bath", "Bed sheets, towels, bathroom accessories"),
        ],
    ),
    node(
        "Women's Fashion",
        "Clothing, shoes, bags, and accessories for women",
        &[
            leaf("Women's Clothing", "Dresses, tops, jeans, traditional wear"),
            leaf("Women's Shoes", "Heels, sandals, sneakers, flats"),
            leaf("Women's Bags", "Handbags, clutches, backpacks"),
            leaf("Women's Accessories", "Scarves, belts, sunglasses"),
        ],
    ),
    node(
        "Men's Fashion",
        "Clothing, shoes, bags, and accessories for men",
        &[
            leaf("Men's Clothing", "Shirts, pants, jeans, traditional wear"),
            leaf("Men's Shoes", "Formal shoes, sneakers, sandals"),
            leaf("Men's Bags", "Backpacks, messenger bags, wallets"),
            leaf("Men's Accessories", "Ties, belts, sunglasses"),
        ],
    ),
    node(
        "Watches, Bags & Jewellery",
        "Watches, handbags, jewelry, and fashion accessories",
        &[
            leaf("Watches", "Men's and women's watches"),
            leaf("Bags & Travel", "Luggage, travel bags, organizers"),
            leaf("Jewellery", "Necklaces, rings, bracelets, earrings"),
        ],
    ),
    node(
        "Sports & Outdoor",
        "Exercise equipment, outdoor gear, and sports accessories",
        &[
            leaf("Exercise & Fitness", "Gym equipment, yoga mats, weights"),
            leaf("Outdoor Recreation", "Camping, hiking, fishing gear"),
            leaf("Sports Accessories", "Balls, protective gear, sportswear"),
        ],
    ),
    node(
        "Automotive & Motorbike",
        "Car and motorcycle parts, accessories, and maintenance products",
        &[
            leaf("Car Accessories", "Car covers, seat covers, organizers"),
            leaf("Car Parts", "Batteries, filters, spark plugs"),
            leaf("Motorbike Accessories", "Helmets, gloves, riding gear"),
        ],
    ),
];

#[derive(Clone)]
pub struct CategorySeeder {
    repo: Arc<dyn CategoryRepository>,
}

impl CategorySeeder {
    pub fn new(repo: Arc<dyn CategoryRepository>) -> Self {
        Self { repo }
    }

    /// Inserts the default marketplace tree into an empty table. Returns the
    /// number of categories written, zero when any category already exists.
    pub async fn seed_defaults(&self) -> anyhow::Result<usize> {
        let existing = self.repo.count().await?;
        if existing > 0 {
            tracing::debug!(existing, "categories already present, skipping seed");
            return Ok(0);
        }

        let categories = flatten(DEFAULT_TREE);
        self.repo.insert_many(&categories).await?;

        let top_level: Vec<&str> = DEFAULT_TREE.iter().map(|seed| seed.name).collect();
        tracing::info!(
            inserted = categories.len(),
            top_level = %top_level.join(", "),
            "category seeding complete"
        );

        Ok(categories.len())
    }
}

/// Parents always precede their children in the returned list.
fn flatten(tree: &[Seed]) -> Vec<Category> {
    let mut out = Vec::new();
    for top in tree {
        let parent = push(&mut out, top, None);
        for second in top.children {
            let id = push(&mut out, second, Some(parent));
            push(&mut out, &OTHER, Some(id));
            for third in second.children {
                push(&mut out, third, Some(id));
            }
        }
    }
    out
}

fn push(out: &mut Vec<Category>, seed: &Seed, parent_id: Option<Uuid>) -> Uuid {
    let category = Category::active(seed.name, seed.description, parent_id);
    let id = category.id;
    out.push(category);
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repositories::in_memory::InMemoryCategoryRepository;

    #[tokio::test]
    async fn seeds_the_full_tree_once() {
        let repo = Arc::new(InMemoryCategoryRepository::new());
        let seeder = CategorySeeder::new(repo.clone());

        assert_eq!(seeder.seed_defaults().await.unwrap(), 161);
        assert_eq!(seeder.seed_defaults().await.unwrap(), 0);
        assert_eq!(repo.count().await.unwrap(), 161);
    }

    #[test]
    fn every_second_level_category_has_an_other_child() {
        let categories = flatten(DEFAULT_TREE);
        let top: Vec<Uuid> = categories
            .iter()
            .filter(|c| c.parent_id.is_none())
            .map(|c| c.id)
            .collect();
        assert_eq!(top.len(), 12);

        let second: Vec<&Category> = categories
            .iter()
            .filter(|c| c.parent_id.is_some_and(|p| top.contains(&p)))
            .collect();
        assert_eq!(second.len(), 54);

        for category in second {
            assert!(
                categories
                    .iter()
                    .any(|c| c.parent_id == Some(category.id) && c.name == "Other"),
                "{} has no Other child",
                category.name
            );
        }
    }

    #[test]
    fn parents_come_before_children() {
        let categories = flatten(DEFAULT_TREE);
        for (index, category) in categories.iter().enumerate() {
            if let Some(parent) = category.parent_id {
                let parent_index = categories.iter().position(|c| c.id == parent).unwrap();
                assert!(parent_index < index);
            }
        }
    }
}
