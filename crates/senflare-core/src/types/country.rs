//! Static region-code to display-name table.

/// Display name used for endpoints whose region could not be determined
pub const UNKNOWN_NAME: &str = "未知";

/// Look up the display name for a region code.
///
/// Both ISO 3166 alpha-2 codes and the handful of alpha-3 codes returned by
/// candidate sources are recognised. `"Unknown"` maps to [`UNKNOWN_NAME`].
#[must_use]
pub fn country_name(code: &str) -> Option<&'static str> {
    let name = match code {
        "US" => "美国",
        "CA" => "加拿大",
        "MX" => "墨西哥",
        "CR" => "哥斯达黎加",
        "GT" => "危地马拉",
        "HN" => "洪都拉斯",
        "NI" => "尼加拉瓜",
        "PA" => "巴拿马",
        "CU" => "古巴",
        "JM" => "牙买加",
        "TT" => "特立尼达和多巴哥",
        "BZ" => "伯利兹",
        "SV" => "萨尔瓦多",
        "DO" => "多米尼加",
        "HT" => "海地",
        "BR" => "巴西",
        "AR" => "阿根廷",
        "CL" => "智利",
        "CO" => "哥伦比亚",
        "PE" => "秘鲁",
        "VE" => "委内瑞拉",
        "UY" => "乌拉圭",
        "PY" => "巴拉圭",
        "BO" => "玻利维亚",
        "EC" => "厄瓜多尔",
        "GY" => "圭亚那",
        "SR" => "苏里南",
        "FK" => "福克兰群岛",
        "UK" | "GB" => "英国",
        "FR" => "法国",
        "DE" => "德国",
        "IT" => "意大利",
        "ES" => "西班牙",
        "NL" => "荷兰",
        "RU" => "俄罗斯",
        "SE" => "瑞典",
        "CH" => "瑞士",
        "BE" => "比利时",
        "AT" => "奥地利",
        "IS" => "冰岛",
        "PL" => "波兰",
        "DK" => "丹麦",
        "NO" => "挪威",
        "FI" => "芬兰",
        "PT" => "葡萄牙",
        "IE" => "爱尔兰",
        "UA" => "乌克兰",
        "CZ" => "捷克",
        "GR" => "希腊",
        "HU" => "匈牙利",
        "RO" => "罗马尼亚",
        "TR" => "土耳其",
        "BG" => "保加利亚",
        "LT" => "立陶宛",
        "LV" => "拉脱维亚",
        "EE" => "爱沙尼亚",
        "BY" => "白俄罗斯",
        "LU" | "LUX" => "卢森堡",
        "SI" => "斯洛文尼亚",
        "SK" => "斯洛伐克",
        "MT" => "马耳他",
        "HR" => "克罗地亚",
        "RS" => "塞尔维亚",
        "BA" => "波黑",
        "ME" => "黑山",
        "MK" => "北马其顿",
        "AL" => "阿尔巴尼亚",
        "XK" => "科索沃",
        "MD" => "摩尔多瓦",
        "GE" => "格鲁吉亚",
        "AM" => "亚美尼亚",
        "AZ" => "阿塞拜疆",
        "CY" => "塞浦路斯",
        "MC" => "摩纳哥",
        "SM" => "圣马力诺",
        "VA" => "梵蒂冈",
        "AD" => "安道尔",
        "LI" => "列支敦士登",
        "CN" => "中国",
        "HK" => "中国香港",
        "TW" => "中国台湾",
        "MO" => "中国澳门",
        "JP" => "日本",
        "KR" => "韩国",
        "SG" | "SGP" => "新加坡",
        "IN" => "印度",
        "ID" => "印度尼西亚",
        "MY" | "MYS" => "马来西亚",
        "TH" => "泰国",
        "PH" => "菲律宾",
        "VN" => "越南",
        "PK" => "巴基斯坦",
        "BD" => "孟加拉",
        "KZ" => "哈萨克斯坦",
        "IL" | "ISR" => "以色列",
        "SA" | "SAU" => "沙特阿拉伯",
        "AE" => "阿联酋",
        "QAT" => "卡塔尔",
        "OMN" => "阿曼",
        "KW" => "科威特",
        "BH" => "巴林",
        "IQ" => "伊拉克",
        "IR" => "伊朗",
        "AF" => "阿富汗",
        "UZ" => "乌兹别克斯坦",
        "KG" => "吉尔吉斯斯坦",
        "TJ" => "塔吉克斯坦",
        "TM" => "土库曼斯坦",
        "MN" => "蒙古",
        "NP" => "尼泊尔",
        "BT" => "不丹",
        "LK" => "斯里兰卡",
        "MV" => "马尔代夫",
        "MM" => "缅甸",
        "LA" => "老挝",
        "KH" => "柬埔寨",
        "BN" => "文莱",
        "TL" => "东帝汶",
        "AU" => "澳大利亚",
        "NZ" => "新西兰",
        "FJ" => "斐济",
        "PG" => "巴布亚新几内亚",
        "NC" => "新喀里多尼亚",
        "VU" => "瓦努阿图",
        "SB" => "所罗门群岛",
        "TO" => "汤加",
        "WS" => "萨摩亚",
        "KI" => "基里巴斯",
        "TV" => "图瓦卢",
        "NR" => "瑙鲁",
        "PW" => "帕劳",
        "FM" => "密克罗尼西亚",
        "MH" => "马绍尔群岛",
        "ZA" => "南非",
        "EG" => "埃及",
        "NG" => "尼日利亚",
        "KE" => "肯尼亚",
        "ET" => "埃塞俄比亚",
        "GH" => "加纳",
        "TZ" => "坦桑尼亚",
        "UG" => "乌干达",
        "DZ" => "阿尔及利亚",
        "MA" => "摩洛哥",
        "TN" => "突尼斯",
        "LY" => "利比亚",
        "SD" => "苏丹",
        "SS" => "南苏丹",
        "ER" => "厄立特里亚",
        "DJ" => "吉布提",
        "SO" => "索马里",
        "RW" => "卢旺达",
        "BI" => "布隆迪",
        "MW" => "马拉维",
        "ZM" => "赞比亚",
        "ZW" => "津巴布韦",
        "BW" => "博茨瓦纳",
        "NA" => "纳米比亚",
        "SZ" => "斯威士兰",
        "LS" => "莱索托",
        "MZ" => "莫桑比克",
        "MG" => "马达加斯加",
        "MU" => "毛里求斯",
        "SC" => "塞舌尔",
        "KM" => "科摩罗",
        "CV" => "佛得角",
        "ST" => "圣多美和普林西比",
        "GW" => "几内亚比绍",
        "GN" => "几内亚",
        "SL" => "塞拉利昂",
        "LR" => "利比里亚",
        "CI" => "科特迪瓦",
        "TG" => "多哥",
        "BJ" => "贝宁",
        "NE" => "尼日尔",
        "BF" => "布基纳法索",
        "ML" => "马里",
        "SN" => "塞内加尔",
        "GM" => "冈比亚",
        "Unknown" => UNKNOWN_NAME,
        _ => return None,
    };
    Some(name)
}
