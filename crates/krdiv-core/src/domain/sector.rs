//! 섹터/전략 분류.
//!
//! 종목명과 기초지수 텍스트를 합쳐 우선순위가 있는 키워드 버킷에 매칭합니다.
//! 우선순위: [자산] > [전략] > [산업] > [테마] > [지수], 최종 버킷은 "[기타] 분류미상".

/// 분류미상 터미널 버킷.
pub const SECTOR_UNCLASSIFIED: &str = "[기타] 분류미상";

/// 우선순위 순서의 (라벨, 키워드) 테이블.
///
/// "금 ", "은 " 뒤의 공백은 의도된 것입니다 ("금융", "은행" 오탐 방지).
const BUCKETS: &[(&str, &[&str])] = &[
    (
        "[자산] 채권/현금",
        &[
            "채권", "국채", "통안", "회사채", "금리", "CD", "KOFR", "파킹", "머니마켓",
            "단기자금", "CASH", "BOND", "통화", "달러", "USD",
        ],
    ),
    ("[자산] 리츠/인프라", &["리츠", "REITS", "부동산", "인프라"]),
    (
        "[자산] 원자재",
        &["금 ", "은 ", "구리", "원자재", "COMMODITY", "금현물", "은현물"],
    ),
    (
        "[전략] 인컴/커버드콜",
        &[
            "커버드콜", "프리미엄", "데일리고정", "COVERED CALL", "PREMIUM", "BUFFALO",
            "타겟리턴", "플러스",
        ],
    ),
    (
        "[전략] 배당/가치/성장",
        &[
            "배당", "고배당", "배당성장", "배당주", "DIVIDEND", "DURABILITY", "가치",
            "VALUE", "저PBR", "퀄리티", "QUALITY", "ESG", "사회책임", "모멘텀", "MOMENTUM",
        ],
    ),
    (
        "[산업] IT/반도체/AI",
        &["반도체", "AI", "테크", "소부장", "IT", "TECH", "DIGITAL", "소프트웨어", "HBM"],
    ),
    (
        "[산업] 금융/은행/보험",
        &["금융", "은행", "보험", "증권", "지주", "FINANCE", "K-금융"],
    ),
    (
        "[산업] 에너지/소재/산업재",
        &[
            "에너지", "화학", "철강", "정유", "원유", "조선", "원자력", "신재생", "친환경",
            "소비재", "화장품", "건설",
        ],
    ),
    (
        "[테마] 2차전지/전기차",
        &["2차전지", "배터리", "BATTERY", "리튬", "전기차", "EV", "에너지솔루션"],
    ),
    (
        "[테마] 바이오/헬스케어",
        &["바이오", "헬스케어", "BIO", "HEALTHCARE", "의료", "제약"],
    ),
    ("[테마] 중소형주", &["중소형", "SMALL CAP", "미드캡"]),
    (
        "[지수] 해외/글로벌",
        &[
            "S&P", "NASDAQ", "나스닥", "다우", "미국", "글로벌", "GLOBAL", "MSCI", "유로",
            "베트남", "인도", "JAPAN", "일본", "차이나", "중국", "액티브",
        ],
    ),
    (
        "[지수] 국내 시장",
        &[
            "200", "KOSPI", "코스피", "KOSDAQ", "코스닥", "150", "KRX300", "삼성그룹",
            "현대차그룹",
        ],
    ),
];

/// 종목명 + 기초지수/분류 텍스트로 섹터 라벨을 결정합니다.
pub fn classify_sector(ticker_name: &str, index_name: &str) -> &'static str {
    let text = format!("{} {}", ticker_name, index_name).to_uppercase();

    for (label, keywords) in BUCKETS {
        if keywords.iter().any(|k| text.contains(k)) {
            return label;
        }
    }

    SECTOR_UNCLASSIFIED
}
