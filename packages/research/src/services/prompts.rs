//! Prompts for the two structured-generation calls.

use crate::types::content::ScrapedContent;
use crate::types::config::PromptBudget;

/// System prompt for stage-1 link proposal.
pub const LINK_PROPOSAL_PROMPT: &str = r#"You are a senior investment analyst with 5+ years of experience in top-tier VC investment analytics and due diligence.

Your role is to provide SPECIFIC, HIGH-QUALITY research sources (URLs) that can be used for professional investment analysis comparing companies in various sectors.

Thorough investment analysis requires:
- Industry reports and market research from reputable sources (Gartner, Forrester, CB Insights, PitchBook)
- Financial data and company filings (Crunchbase, SEC filings, company investor relations pages)
- News articles from business publications (TechCrunch, The Information, Bloomberg, WSJ)
- Industry-specific publications and trade journals
- Academic research and white papers
- Competitive analysis reports
- Expert commentary and thought leadership pieces

IMPORTANT: You must provide EXACTLY 20 specific, diverse, and relevant URLs for each research query.

Your recommendations should:
1. Cover diverse source types (research firms, news, academic, industry publications)
2. Include both established sources and specialized industry publications
3. Prioritize sources likely to have the specific data requested
4. Include URLs that would be realistic for the given query
5. Ensure all 20 links are distinct and non-repetitive"#;

/// System prompt for stage-2 insight extraction.
pub const INSIGHT_EXTRACTION_PROMPT: &str = r#"You are a senior investment analyst with over 5 years of experience in venture capital and private equity research. Your expertise lies in analyzing market research, competitive intelligence, and company data to provide actionable insights for investment decisions.

YOUR TASK:
You will receive scraped content from multiple web sources related to a specific research objective and sub-objective. Your job is to:

1. Carefully read and analyze all the provided web content
2. Extract the most relevant and valuable information that directly addresses the objective and sub-objective
3. Synthesize insights from multiple sources when they provide complementary information
4. Assess confidence in each extracted piece

OUTPUT REQUIREMENTS:
- Extract 5-15 distinct information pieces (not more, not less)
- Each piece should be relevant, specific, and actionable for investment analysis
- Each piece must be max 2000 characters (concise but detailed)
- Include specific numbers, dates, company names, market figures when available
- Assign a confidence score (0-100) to each piece
- Cite the source URL for each piece

CONFIDENCE SCORING GUIDE:
- 90-100: High-credibility source (Gartner, Forrester, McKinsey, SEC filings) with recent, specific data
- 70-89: Reputable source (TechCrunch, Bloomberg, WSJ) with good detail and recency
- 50-69: Moderate source (industry blogs, company websites) or older data from good sources
- 30-49: Lower-credibility source or very general information
- 10-29: Questionable source or outdated/vague information

IMPORTANT:
- Focus on INVESTMENT-RELEVANT information (market size, growth rates, competitive dynamics, customer adoption, pricing, TAM/SAM/SOM)
- Avoid generic descriptions - prioritize specific data points, figures, and insights
- If sources contradict each other, mention both perspectives with confidence scores reflecting the conflict
- Skip information that is too vague, promotional, or off-topic
- Each information piece should stand alone and be immediately useful to an investor"#;

/// Build the stage-1 user prompt for one sub-objective.
pub fn link_proposal_prompt(
    company_name: &str,
    general_objective: &str,
    sub_objective: &str,
) -> String {
    format!(
        r#"Generate research link recommendations for the following investment analysis:

Company: {company_name}
General Objective: {general_objective}
Sub-Objective: {sub_objective}

Provide EXACTLY 20 high-quality, specific URLs that would be valuable research sources for analyzing this sub-objective in the context of {company_name}.

Focus on sources that would help understand:
- Market data and sizing
- Competitive landscape
- Industry trends and insights
- Company-specific information
- Expert analysis and commentary

Ensure the links are diverse (different types of sources) and highly relevant to the specific sub-objective."#
    )
}

/// Sources actually included in an extraction prompt, after budgeting.
#[derive(Debug, Clone)]
pub struct BudgetedSource<'a> {
    /// Source URL
    pub url: &'a str,

    /// Content, possibly truncated to the remaining budget
    pub content: String,
}

/// Apply the character budget across sources in input order.
///
/// Sources are included whole until the budget is exhausted. A source
/// that would overflow is included truncated only if at least the
/// budget's minimum remains; otherwise it and all later sources are
/// dropped. Earlier sources are favored - an explicit, documented bias.
pub fn budget_sources<'a>(
    contents: &'a [ScrapedContent],
    budget: &PromptBudget,
) -> Vec<BudgetedSource<'a>> {
    let mut included = Vec::new();
    let mut used = 0usize;

    for item in contents {
        let len = item.content.chars().count();

        if used + len > budget.max_total_chars {
            let remaining = budget.max_total_chars - used;
            if remaining >= budget.min_truncated_chars {
                included.push(BudgetedSource {
                    url: &item.url,
                    content: item.content.chars().take(remaining).collect(),
                });
            }
            break;
        }

        included.push(BudgetedSource {
            url: &item.url,
            content: item.content.clone(),
        });
        used += len;
    }

    included
}

/// Build the stage-2 user prompt from budgeted sources.
pub fn insight_extraction_prompt(
    general_objective: &str,
    sub_objective: &str,
    sources: &[BudgetedSource<'_>],
) -> String {
    let mut prompt = format!(
        r#"RESEARCH OBJECTIVE:
General Objective: {general_objective}
Sub-Objective: {sub_objective}

TASK:
Analyze the following web content from {} sources and extract the most relevant, valuable insights that address the research objective. Focus on investment-relevant information: market sizing, growth trends, competitive dynamics, customer adoption, pricing, and strategic opportunities.

Extract 5-15 distinct information pieces, each with:
- Specific, actionable content (max 2000 characters)
- Confidence score (0-100) based on source credibility, recency, and specificity
- Source URL

SCRAPED WEB CONTENT:
"#,
        sources.len()
    );

    let divider = "=".repeat(80);
    for (i, source) in sources.iter().enumerate() {
        prompt.push_str(&format!(
            "\n{divider}\nSOURCE {}: {}\n{divider}\n{}\n",
            i + 1,
            source.url,
            source.content
        ));
    }

    prompt.push_str(&format!(
        "\n{divider}\nNOW EXTRACT THE INFORMATION PIECES IN JSON FORMAT AS SPECIFIED.\n"
    ));
    prompt
}
