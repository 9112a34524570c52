//! Rubric and prompt construction for clause risk scoring.
//!
//! The tier ordering (legality → fairness → clarity) and the conservative,
//! worker-favorable tie-breaking are policy decisions that live entirely in
//! this prompt text. Nothing downstream validates the model's reasoning
//! order, so the wording here must stay stable.

/// Three-tier criteria statement handed to the grading model.
pub const TOXIC_CRITERIA: &str = "\
You are a professional labor-law AI auditing an employment contract for \
[legal validity], [fairness], and [clarity].
Analyze the clause and assign a score according to these three core principles.

[Three Core Principles]
1. Legality - [critical / red zone]
   - Does the clause violate mandatory labor statutes?
   - Examples: pay below minimum wage, retirement-benefit waivers, \
predetermined damages (liquidated-damages clauses), dismissal-notice violations.
   - Verdict: any violation scores 9-10, unconditionally.

2. Fairness - [elevated / orange zone]
   - Does it favor only the employer while imposing excessive duties on the worker?
   - Examples: \"the worker compensates all damages\", \"a replacement must be \
found before resigning\", \"any breach of internal rules is punished\".
   - Verdict: not illegal, but one-sided enough to wrong the worker scores 6-8.

3. Clarity - [caution / yellow zone]
   - Does the wording permit arbitrary, one-sided interpretation?
   - Examples: \"when the company deems it necessary\", \"according to custom\", \
\"other duties the employer assigns\".
   - Verdict: vague wording likely to cause disputes scores 3-5.";

/// Score bands mapped to qualitative outcomes, supplied as grading guidance.
pub const RUBRIC_BANDS: &[(u8, u8, &str)] = &[
    (
        0,
        2,
        "A fully compliant clause satisfying all three principles (validity, fairness, clarity).",
    ),
    (
        3,
        5,
        "[Insufficient clarity] - Legally sound, but the wording is vague enough to allow one-sided interpretation by the company.",
    ),
    (
        6,
        8,
        "[Lack of fairness] - Just short of illegal. Unilaterally unfavorable to the worker or shifts the burden of proof onto them.",
    ),
    (
        9,
        10,
        "[No legal effect] - Violates a mandatory labor-law provision; the clause itself is void.",
    ),
];

/// Ordered chain-of-thought steps. Tiers are checked in strict priority
/// order: critical first, falling through only when a tier is not triggered.
pub const EVALUATION_STEPS: &[&str] = &[
    "Step 1 [Intent]: identify the clause's core intent (wage reduction, easy dismissal, liability shifting) and load general legal knowledge.",
    "Step 2 [Legality/critical]: check for mandatory labor-statute violations first. Keywords such as 'retirement benefit waiver', 'predetermined damages', or 'forced labor' score 10 immediately.",
    "Step 3 [Fairness/elevated]: if not illegal, weigh the balance of rights and duties. Score 6-8 when only the employer benefits or the worker carries excessive duties.",
    "Step 4 [Clarity/caution]: even if the content looks fair, score 3-5 when ambiguous words like 'other' or 'reasonable' permit arbitrary interpretation.",
    "Step 5 [Final verdict]: settle the score through the steps above; in a grey area without firm legal grounding, interpret conservatively in the worker's favor before fixing the final score.",
];

/// Assemble the single scoring prompt for one clause: criteria, rubric
/// bands, ordered steps, strict-JSON output instruction, then the clause
/// and its retrieval context.
pub fn build_scoring_prompt(clause_text: &str, context: &str) -> String {
    let mut prompt = String::with_capacity(4096);
    prompt.push_str(TOXIC_CRITERIA);
    prompt.push_str("\n\n[Scoring Rubric]\n");
    for (lo, hi, outcome) in RUBRIC_BANDS {
        prompt.push_str(&format!("- {lo}-{hi}: {outcome}\n"));
    }
    prompt.push_str("\n[Evaluation Steps]\n");
    for step in EVALUATION_STEPS {
        prompt.push_str(step);
        prompt.push('\n');
    }
    prompt.push_str(
        "\nRespond ONLY with valid JSON:\n{\"score\": <number from 0 to 10>, \"reason\": \"<your grading rationale>\"}\n",
    );
    prompt.push_str("\n[Clause Under Review]\n");
    prompt.push_str(clause_text);
    prompt.push_str("\n\n[Retrieval Context]\n");
    prompt.push_str(context);
    prompt
}
