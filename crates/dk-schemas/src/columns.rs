//! Output column names.
//!
//! These match the persistence API's record schema exactly; the sink does no
//! schema negotiation.

pub const ANO: &str = "vl_ano";
pub const MES: &str = "vl_mes";
pub const SUBMERCADO: &str = "cd_submercado";
pub const SUBMERCADO_PARA: &str = "cd_submercado_para";
pub const PATAMAR: &str = "patamar";
pub const CATEGORIA: &str = "categoria";
pub const VERSAO: &str = "versao";
pub const DT_DECK: &str = "dt_deck";

// SISTEMA
pub const ENERGIA_TOTAL: &str = "vl_energia_total";
pub const GERACAO_PCH: &str = "vl_geracao_pch";
pub const GERACAO_PCT: &str = "vl_geracao_pct";
pub const GERACAO_EOL: &str = "vl_geracao_eol";
pub const GERACAO_UFV: &str = "vl_geracao_ufv";
pub const GERACAO_PCH_MMGD: &str = "vl_geracao_pch_mmgd";
pub const GERACAO_PCT_MMGD: &str = "vl_geracao_pct_mmgd";
pub const GERACAO_EOL_MMGD: &str = "vl_geracao_eol_mmgd";
pub const GERACAO_UFV_MMGD: &str = "vl_geracao_ufv_mmgd";

// CADIC
pub const CONST_ITAIPU: &str = "vl_const_itaipu";
pub const ANDE: &str = "vl_ande";
pub const MMGD_SE: &str = "vl_mmgd_se";
pub const MMGD_S: &str = "vl_mmgd_s";
pub const MMGD_NE: &str = "vl_mmgd_ne";
pub const MMGD_N: &str = "vl_mmgd_n";
pub const BOA_VISTA: &str = "vl_boa_vista";

// PATAMAR
pub const VALOR_PU: &str = "vl_pu";
pub const DURACAO_PATAMAR: &str = "vl_duracao_patamar";
pub const INTERCAMBIO: &str = "vl_intercambio";
