//! First-run demo data so a fresh server is browsable before any real
//! documents exist.

use chrono::Utc;
use knowdesk_core::types::{
    ChatMessage, ChatSession, DocStatus, Document, KnowledgeBase, Role, SourceRef, new_id,
};

pub fn knowledge_bases() -> Vec<KnowledgeBase> {
    vec![
        KnowledgeBase {
            id: "kb1".into(),
            name: "公司政策".into(),
            description: "包含人力资源、报销流程等核心文档".into(),
            icon: "📄".into(),
            color: "#4F46E5".into(),
            file_count: 0,
            updated_at: "2小时前".into(),
            files: vec![],
        },
        KnowledgeBase {
            id: "kb2".into(),
            name: "产品常见问题".into(),
            description: "汇总用户最常问的产品操作问题".into(),
            icon: "❓".into(),
            color: "#3B82F6".into(),
            file_count: 3,
            updated_at: "5小时前".into(),
            files: vec![
                Document {
                    id: "f1".into(),
                    name: "2024产品更新路线图.pdf".into(),
                    size: "2.4 MB".into(),
                    uploaded_at: "10分钟前".into(),
                    status: DocStatus::Synced,
                },
                Document {
                    id: "f2".into(),
                    name: "常见登录问题解决指南.docx".into(),
                    size: "842 KB".into(),
                    uploaded_at: "1小时前".into(),
                    status: DocStatus::Synced,
                },
                Document {
                    id: "f3".into(),
                    name: "API接口集成文档.txt".into(),
                    size: "156 KB".into(),
                    uploaded_at: "昨天".into(),
                    status: DocStatus::Synced,
                },
            ],
        },
        KnowledgeBase {
            id: "kb3".into(),
            name: "员工手册".into(),
            description: "关于公司文化、价值观及日常行为准则".into(),
            icon: "📗".into(),
            color: "#F59E0B".into(),
            file_count: 0,
            updated_at: "1天前".into(),
            files: vec![],
        },
        KnowledgeBase {
            id: "kb4".into(),
            name: "售后流程".into(),
            description: "标准化的售后处理逻辑与退换货政策".into(),
            icon: "🔧".into(),
            color: "#10B981".into(),
            file_count: 0,
            updated_at: "3天前".into(),
            files: vec![],
        },
    ]
}

pub fn chats() -> Vec<ChatSession> {
    vec![ChatSession {
        id: "c1".into(),
        user_id: "李明".into(),
        title: "关于公司带薪休假政策".into(),
        pinned: true,
        created_at: Utc::now().to_rfc3339(),
        messages: vec![
            ChatMessage {
                id: new_id("m"),
                role: Role::Assistant,
                content: "您好！我是您的智能助理。有什么我可以帮您的吗？您可以询问关于公司政策、报销、福利等方面的问题。".into(),
                created_at: "09:41".into(),
                source: None,
            },
            ChatMessage {
                id: new_id("m"),
                role: Role::User,
                content: "我想了解公司的休假政策，尤其是年假的规定。".into(),
                created_at: "09:42".into(),
                source: None,
            },
            ChatMessage {
                id: new_id("m"),
                role: Role::Assistant,
                content: "根据公司的休假政策，正式员工享有的年假安排如下：\n\n• 入职满1年不满10年的员工，每年享有 **5天** 带薪年假。\n• 入职满10年不满20年的员工，每年享有 **10天** 带薪年假。\n• 入职满20年的员工，每年享有 **15天** 带薪年假。\n\n年假申请须提前5个工作日在OA系统提交，并经部门负责人批准。".into(),
                created_at: "09:42".into(),
                source: Some(SourceRef {
                    name: "公司员工手册 - 福利章节".into(),
                    updated_at: "2023年8月15日".into(),
                }),
            },
        ],
    }]
}
