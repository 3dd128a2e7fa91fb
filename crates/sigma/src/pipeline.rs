//! 필드 정규화 파이프라인 -- 추상 필드명을 백엔드 스키마 필드명으로 변환
//!
//! 규칙은 로그 소스의 추상 필드명(`CommandLine`, `id.orig_h` 등)으로
//! 작성되고, 파이프라인이 이를 대상 인덱스의 ECS 필드명으로
//! 정규화합니다. 매핑이 없는 필드는 원문 그대로 통과합니다.
//!
//! 빌트인 파이프라인 목록은 [`builtin_pipelines`]를 참조하세요.

use std::collections::HashMap;

/// 이름 있는 필드 매핑 파이프라인
///
/// 컴파일 시점에 [`LuceneBackend`](crate::backend::LuceneBackend)가
/// predicate의 필드명에 적용합니다.
#[derive(Debug, Clone, Default)]
pub struct FieldPipeline {
    name: String,
    fields: HashMap<String, String>,
}

impl FieldPipeline {
    /// 빈 매핑으로 파이프라인을 생성합니다.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: HashMap::new(),
        }
    }

    /// 매핑 쌍 목록으로 파이프라인을 생성합니다.
    pub fn with_mappings(name: impl Into<String>, pairs: &[(&str, &str)]) -> Self {
        let mut pipeline = Self::new(name);
        for (source, target) in pairs {
            pipeline.add_mapping(*source, *target);
        }
        pipeline
    }

    /// 변환 없는 identity 파이프라인을 생성합니다.
    pub fn identity() -> Self {
        Self::new("identity")
    }

    /// 파이프라인 이름을 반환합니다.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 필드명을 정규화합니다.
    ///
    /// 매핑이 없으면 입력을 그대로 반환합니다.
    pub fn normalize<'a>(&'a self, field: &'a str) -> &'a str {
        self.fields.get(field).map(String::as_str).unwrap_or(field)
    }

    /// 해당 필드에 매핑이 있는지 확인합니다.
    pub fn has_mapping(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// 매핑을 추가합니다 (동일 키는 덮어씀).
    pub fn add_mapping(&mut self, source: impl Into<String>, target: impl Into<String>) {
        self.fields.insert(source.into(), target.into());
    }

    /// 매핑 수를 반환합니다.
    pub fn mapping_count(&self) -> usize {
        self.fields.len()
    }

    /// 변환 없는 파이프라인인지 여부를 반환합니다.
    pub fn is_identity(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Windows 이벤트 로그 ECS 파이프라인 (현행 winlogbeat 스키마)
pub fn ecs_windows() -> FieldPipeline {
    FieldPipeline::with_mappings(
        "ecs_windows",
        &[
            ("CommandLine", "process.command_line"),
            ("Image", "process.executable"),
            ("ParentImage", "process.parent.executable"),
            ("ParentCommandLine", "process.parent.command_line"),
            ("OriginalFileName", "process.pe.original_file_name"),
            ("User", "user.name"),
            ("TargetFilename", "file.path"),
            ("SourceIp", "source.ip"),
            ("SourcePort", "source.port"),
            ("DestinationIp", "destination.ip"),
            ("DestinationPort", "destination.port"),
            ("DestinationHostname", "destination.domain"),
            ("EventID", "event.code"),
            ("Provider_Name", "winlog.provider_name"),
            ("TargetObject", "registry.path"),
            ("ScriptBlockText", "powershell.file.script_block_text"),
        ],
    )
}

/// Windows 이벤트 로그 레거시 파이프라인 (winlog.event_data 스키마)
///
/// 현재 선택 로직은 항상 [`ecs_windows`]를 고르지만, 구형 로그
/// 수집기를 위한 명명 파이프라인으로 유지됩니다.
pub fn ecs_windows_old() -> FieldPipeline {
    FieldPipeline::with_mappings(
        "ecs_windows_old",
        &[
            ("CommandLine", "winlog.event_data.CommandLine"),
            ("Image", "winlog.event_data.Image"),
            ("ParentImage", "winlog.event_data.ParentImage"),
            ("ParentCommandLine", "winlog.event_data.ParentCommandLine"),
            ("User", "winlog.event_data.User"),
            ("TargetFilename", "winlog.event_data.TargetFilename"),
            ("TargetObject", "winlog.event_data.TargetObject"),
            ("EventID", "winlog.event_id"),
            ("Provider_Name", "winlog.provider_name"),
        ],
    )
}

/// Zeek 로그 ECS 파이프라인 (filebeat Zeek 모듈 스키마)
pub fn ecs_zeek_beats() -> FieldPipeline {
    FieldPipeline::with_mappings(
        "ecs_zeek_beats",
        &[
            ("id.orig_h", "source.ip"),
            ("id.orig_p", "source.port"),
            ("id.resp_h", "destination.ip"),
            ("id.resp_p", "destination.port"),
            ("proto", "network.transport"),
            ("duration", "event.duration"),
            ("orig_bytes", "source.bytes"),
            ("resp_bytes", "destination.bytes"),
            ("query", "dns.question.name"),
            ("qtype_name", "dns.question.type"),
            ("answers", "dns.answers.data"),
            ("method", "http.request.method"),
            ("status_code", "http.response.status_code"),
            ("host", "url.domain"),
            ("uri", "url.original"),
            ("user_agent", "user_agent.original"),
        ],
    )
}

/// Zeek 로그 Corelight 센서 파이프라인
pub fn ecs_zeek_corelight() -> FieldPipeline {
    FieldPipeline::with_mappings(
        "ecs_zeek_corelight",
        &[
            ("id.orig_h", "source.ip"),
            ("id.orig_p", "source.port"),
            ("id.resp_h", "destination.ip"),
            ("id.resp_p", "destination.port"),
            ("proto", "network.transport"),
            ("service", "network.protocol"),
            ("uid", "zeek.session_id"),
            ("community_id", "network.community_id"),
            ("query", "dns.question.name"),
            ("method", "http.request.method"),
            ("status_code", "http.response.status_code"),
            ("user_agent", "user_agent.original"),
        ],
    )
}

/// Zeek 원시 필드 파이프라인 (zeek.* 네임스페이스 유지)
pub fn zeek_raw() -> FieldPipeline {
    FieldPipeline::with_mappings(
        "zeek_raw",
        &[
            ("id.orig_h", "zeek.id.orig_h"),
            ("id.orig_p", "zeek.id.orig_p"),
            ("id.resp_h", "zeek.id.resp_h"),
            ("id.resp_p", "zeek.id.resp_p"),
            ("uid", "zeek.uid"),
            ("proto", "zeek.proto"),
        ],
    )
}

/// Kubernetes audit 로그 ECS 파이프라인
pub fn ecs_kubernetes() -> FieldPipeline {
    FieldPipeline::with_mappings(
        "ecs_kubernetes",
        &[
            ("verb", "kubernetes.audit.verb"),
            ("objectRef.resource", "kubernetes.audit.objectRef.resource"),
            ("objectRef.namespace", "kubernetes.audit.objectRef.namespace"),
            ("objectRef.name", "kubernetes.audit.objectRef.name"),
            ("user.username", "kubernetes.audit.user.username"),
            ("user.groups", "kubernetes.audit.user.groups"),
            ("requestURI", "kubernetes.audit.requestURI"),
            ("responseStatus.code", "kubernetes.audit.responseStatus.code"),
            ("sourceIPs", "kubernetes.audit.sourceIPs"),
            (
                "impersonatedUser.username",
                "kubernetes.audit.impersonatedUser.username",
            ),
        ],
    )
}

/// 빌트인 파이프라인 전체 목록 (선택 우선순위 순서)
pub fn builtin_pipelines() -> Vec<FieldPipeline> {
    vec![
        ecs_windows(),
        ecs_windows_old(),
        ecs_zeek_beats(),
        ecs_zeek_corelight(),
        zeek_raw(),
        ecs_kubernetes(),
        FieldPipeline::identity(),
    ]
}
