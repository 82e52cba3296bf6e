//! Entity classification by display name.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Visual category assigned to an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
	/// People and roles.
	Person,
	/// Companies, institutions, teams.
	Organization,
	/// Places and addresses.
	Location,
	/// Illnesses, treatments, health.
	Medical,
	/// Money, rates, payments.
	Financial,
	/// Laws, contracts, clauses.
	Legal,
	/// Products, services, benefits.
	Service,
	/// Systems, apps, digital channels.
	Technology,
	/// Activities and procedures.
	Event,
	/// Tables, lists, kinds.
	Category,
	/// Nothing matched.
	Unknown,
}

/// Substring rules tested in order; the first rule with a hit wins.
const RULES: &[(EntityType, &[&str])] = &[
	(
		EntityType::Person,
		&[
			"씨", "님", "사람", "고객", "환자", "의사", "변호사", "회장", "대표", "직원", "관리자",
			"mr.", "mrs.", "ms.", "dr.", "customer", "patient", "doctor", "lawyer", "employee",
			"manager", "president",
		],
	),
	(
		EntityType::Organization,
		&[
			"회사", "보험", "은행", "병원", "법원", "정부", "부서", "팀", "그룹", "생명", "기관",
			"센터", "abl", "company", "corp", "inc.", "ltd", "bank", "hospital", "court",
			"government", "department", "agency", "insurance", "institute", "university",
		],
	),
	(
		EntityType::Location,
		&[
			"시", "구", "동", "로", "길", "지역", "위치", "주소", "장소", "city", "street", "avenue",
			"district", "region", "province", "address",
		],
	),
	(
		EntityType::Medical,
		&[
			"암", "병", "치료", "진단", "수술", "약", "증상", "질환", "의료", "건강", "질병",
			"갑상선", "심장", "수질성", "재활", "cancer", "disease", "therapy", "treatment",
			"diagnosis", "surgery", "symptom", "medical", "health",
		],
	),
	(
		EntityType::Financial,
		&[
			"보험금", "금", "원", "율", "이자", "대출", "투자", "수익", "료", "비용", "가격", "연금",
			"적립", "배당", "수익률", "loan", "interest", "invest", "fee", "cost", "price",
			"pension", "dividend", "premium", "fund",
		],
	),
	(
		EntityType::Legal,
		&[
			"법", "계약", "약관", "소송", "판결", "권리", "의무", "조항", "규정", "청약", "해지",
			"철회", "law", "contract", "lawsuit", "clause", "regulation", "legal", "statute",
		],
	),
	(
		EntityType::Service,
		&[
			"서비스", "상품", "제품", "특약", "보장", "혜택", "프로그램", "상담", "지원", "service",
			"product", "program", "benefit", "coverage", "support",
		],
	),
	(
		EntityType::Technology,
		&[
			"코드", "qr", "앱", "ai", "디지털", "온라인", "시스템", "view", "software", "digital",
			"online", "system",
		],
	),
	(
		EntityType::Event,
		&[
			"이벤트", "활동", "행사", "프로세스", "절차", "과정", "납입", "지급", "면제", "event",
			"activity", "process", "procedure", "meeting", "conference",
		],
	),
	(
		EntityType::Category,
		&[
			"분류표", "표", "목록", "형", "종류", "유형", "table", "list", "kind", "category",
			"classification",
		],
	),
];

/// Display color per category. Total over [`EntityType::ALL`].
const COLORS: &[(EntityType, &str)] = &[
	(EntityType::Person, "#4169E1"),
	(EntityType::Organization, "#0f705d"),
	(EntityType::Location, "#cf6d17"),
	(EntityType::Medical, "#ff99cc"),
	(EntityType::Financial, "#b300b3"),
	(EntityType::Legal, "#0f558a"),
	(EntityType::Service, "#00cc00"),
	(EntityType::Technology, "#2F4F4F"),
	(EntityType::Event, "#00bfa0"),
	(EntityType::Category, "#e3493b"),
	(EntityType::Unknown, "#f4d371"),
];

/// Fallback for a category missing from the color table.
pub const DEFAULT_COLOR: &str = "#f4d371";

/// Type names and localized synonyms accepted by [`EntityType::from_type_name`].
const SYNONYMS: &[(&str, EntityType)] = &[
	("unknown", EntityType::Unknown),
	("other", EntityType::Unknown),
	("미지", EntityType::Unknown),
	("category", EntityType::Category),
	("type", EntityType::Category),
	("류별", EntityType::Category),
	("분류", EntityType::Category),
	("organization", EntityType::Organization),
	("org", EntityType::Organization),
	("company", EntityType::Organization),
	("조직", EntityType::Organization),
	("회사", EntityType::Organization),
	("기관", EntityType::Organization),
	("group", EntityType::Organization),
	("event", EntityType::Event),
	("activity", EntityType::Event),
	("사건", EntityType::Event),
	("활동", EntityType::Event),
	("person", EntityType::Person),
	("people", EntityType::Person),
	("human", EntityType::Person),
	("인물", EntityType::Person),
	("인", EntityType::Person),
	("location", EntityType::Location),
	("place", EntityType::Location),
	("address", EntityType::Location),
	("geo", EntityType::Location),
	("geography", EntityType::Location),
	("지점", EntityType::Location),
	("위치", EntityType::Location),
	("주소", EntityType::Location),
	("지리", EntityType::Location),
	("지역", EntityType::Location),
	("medical", EntityType::Medical),
	("health", EntityType::Medical),
	("의료", EntityType::Medical),
	("financial", EntityType::Financial),
	("finance", EntityType::Financial),
	("금융", EntityType::Financial),
	("legal", EntityType::Legal),
	("law", EntityType::Legal),
	("법률", EntityType::Legal),
	("service", EntityType::Service),
	("product", EntityType::Service),
	("object", EntityType::Service),
	("서비스", EntityType::Service),
	("상품", EntityType::Service),
	("물품", EntityType::Service),
	("technology", EntityType::Technology),
	("tech", EntityType::Technology),
	("equipment", EntityType::Technology),
	("device", EntityType::Technology),
	("기술", EntityType::Technology),
	("과학기술", EntityType::Technology),
	("설비", EntityType::Technology),
	("장비", EntityType::Technology),
];

impl EntityType {
	/// Every category, in rule order with `Unknown` last.
	pub const ALL: [EntityType; 11] = [
		EntityType::Person,
		EntityType::Organization,
		EntityType::Location,
		EntityType::Medical,
		EntityType::Financial,
		EntityType::Legal,
		EntityType::Service,
		EntityType::Technology,
		EntityType::Event,
		EntityType::Category,
		EntityType::Unknown,
	];

	/// Lower-case tag stored in `entity_type`.
	pub fn as_str(self) -> &'static str {
		match self {
			EntityType::Person => "person",
			EntityType::Organization => "organization",
			EntityType::Location => "location",
			EntityType::Medical => "medical",
			EntityType::Financial => "financial",
			EntityType::Legal => "legal",
			EntityType::Service => "service",
			EntityType::Technology => "technology",
			EntityType::Event => "event",
			EntityType::Category => "category",
			EntityType::Unknown => "unknown",
		}
	}

	/// Legend caption.
	pub fn display_name(self) -> &'static str {
		match self {
			EntityType::Person => "Person",
			EntityType::Organization => "Organization",
			EntityType::Location => "Location",
			EntityType::Medical => "Medical",
			EntityType::Financial => "Financial",
			EntityType::Legal => "Legal",
			EntityType::Service => "Service",
			EntityType::Technology => "Technology",
			EntityType::Event => "Event",
			EntityType::Category => "Category",
			EntityType::Unknown => "Unknown",
		}
	}

	/// Fixed display color of this category.
	pub fn color(self) -> &'static str {
		COLORS
			.iter()
			.find(|(ty, _)| *ty == self)
			.map(|(_, color)| *color)
			.unwrap_or(DEFAULT_COLOR)
	}

	/// Normalize a free-form type name, accepting localized synonyms.
	pub fn from_type_name(name: &str) -> Option<EntityType> {
		let name = name.trim().to_lowercase();
		SYNONYMS
			.iter()
			.find(|(synonym, _)| *synonym == name)
			.map(|(_, ty)| *ty)
	}
}

impl fmt::Display for EntityType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for EntityType {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		EntityType::from_type_name(s).ok_or_else(|| format!("unknown entity type `{s}`"))
	}
}

/// Map an entity's display name to its category.
pub fn classify(name: &str) -> EntityType {
	let name = name.to_lowercase();
	RULES
		.iter()
		.find(|(_, needles)| needles.iter().any(|needle| name.contains(needle)))
		.map(|(ty, _)| *ty)
		.unwrap_or(EntityType::Unknown)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn first_matching_rule_wins() {
		// "보험" (organization) and "지역" (location) both match; organization is listed first.
		assert_eq!(classify("지역보험"), EntityType::Organization);
		// "고객" (person) outranks "센터" (organization).
		assert_eq!(classify("고객센터"), EntityType::Person);
	}

	#[test]
	fn matching_ignores_case() {
		assert_eq!(classify("ABL생명"), EntityType::Organization);
		assert_eq!(classify("QR"), EntityType::Technology);
		assert_eq!(classify("Acme Corp"), EntityType::Organization);
	}

	#[test]
	fn falls_back_to_unknown() {
		assert_eq!(classify("Alice"), EntityType::Unknown);
		assert_eq!(classify(""), EntityType::Unknown);
	}

	#[test]
	fn every_rule_category_is_reachable() {
		let samples = [
			("김철수님", EntityType::Person),
			("한국은행", EntityType::Organization),
			("Main Street", EntityType::Location),
			("갑상선", EntityType::Medical),
			("이자", EntityType::Financial),
			("판결", EntityType::Legal),
			("상담", EntityType::Service),
			("디지털", EntityType::Technology),
			("납입", EntityType::Event),
			("종류", EntityType::Category),
		];
		for (name, expected) in samples {
			assert_eq!(classify(name), expected, "{name}");
		}
	}

	#[test]
	fn classification_is_deterministic() {
		for name in ["Acme Corp", "고객센터", "ghost", "Spain", "납입면제"] {
			assert_eq!(classify(name), classify(name));
		}
	}

	#[test]
	fn color_table_is_total() {
		for ty in EntityType::ALL {
			assert!(COLORS.iter().any(|(t, _)| *t == ty), "{ty} has no color");
		}
		for (ty, _) in RULES {
			assert!(COLORS.iter().any(|(t, _)| t == ty), "{ty} has no color");
		}
		assert_eq!(EntityType::Person.color(), "#4169E1");
	}

	#[test]
	fn synonyms_normalize() {
		assert_eq!(EntityType::from_type_name("Company"), Some(EntityType::Organization));
		assert_eq!(EntityType::from_type_name("위치"), Some(EntityType::Location));
		assert_eq!(EntityType::from_type_name(" other "), Some(EntityType::Unknown));
		assert_eq!(EntityType::from_type_name("spaceship"), None);
		for ty in EntityType::ALL {
			assert_eq!(ty.as_str().parse::<EntityType>(), Ok(ty));
		}
	}
}
